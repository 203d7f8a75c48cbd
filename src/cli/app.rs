//! Application runners for recording and file modes

use std::env;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::application::ports::ConfigStore;
use crate::application::{PipelineError, RecordingPipeline};
use crate::domain::audio::PcmContainer;
use crate::domain::config::AppConfig;
use crate::infrastructure::{CpalCaptureSource, HttpTransport, SymphoniaDecoder, XdgConfigStore};

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the configured endpoint
pub const ENDPOINT_ENV: &str = "WAVSCRIBE_ENDPOINT";

/// How often the recording progress line is redrawn
const PROGRESS_TICK: Duration = Duration::from_millis(250);

/// Typing this and pressing Enter discards the recording
const DISCARD_COMMAND: &str = "q";

type CliPipeline = RecordingPipeline<CpalCaptureSource, SymphoniaDecoder, HttpTransport>;

/// Resolved options for a microphone recording
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub endpoint: String,
    pub max_duration: Duration,
    pub queue_capacity: usize,
    pub timeout: Duration,
    pub output: Option<PathBuf>,
    pub upload: bool,
}

impl RecordOptions {
    /// Build from merged config and the per-run flags
    pub fn from_config(config: &AppConfig, output: Option<PathBuf>, upload: bool) -> Self {
        Self {
            endpoint: config.endpoint_or_default().to_string(),
            max_duration: config.max_duration_or_default(),
            queue_capacity: config.queue_capacity_or_default(),
            timeout: config.timeout_or_default(),
            output,
            upload,
        }
    }
}

/// Why the recording loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Requested,
    Interrupted,
    LimitReached,
    StreamEnded,
    Discarded,
}

/// Record from the microphone until stopped, then convert and upload
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut pipeline = match build_pipeline(&options.endpoint, options.timeout) {
        Ok(pipeline) => pipeline.with_queue_capacity(options.queue_capacity),
        Err(e) => return fail(&mut presenter, &e),
    };

    presenter.start_spinner("Opening microphone...");
    if let Err(e) = pipeline.start().await {
        return fail(&mut presenter, &e);
    }

    let reason = record_until_stopped(&mut pipeline, &presenter, options.max_duration).await;
    debug!(?reason, "recording loop ended");

    if reason == StopReason::Discarded {
        if let Err(e) = pipeline.cancel().await {
            return fail(&mut presenter, &e);
        }
        presenter.spinner_success("Recording discarded");
        return ExitCode::from(EXIT_SUCCESS);
    }
    if reason == StopReason::LimitReached {
        presenter.update_spinner("Recording limit reached, converting...");
    } else {
        presenter.update_spinner("Converting...");
    }

    if !options.upload {
        let container = match pipeline.stop().await {
            Ok(container) => container,
            Err(e) => return fail(&mut presenter, &e),
        };
        presenter.spinner_success(&format!(
            "Recorded {}",
            container.human_readable_size()
        ));
        return match &options.output {
            Some(path) => save_container(&presenter, &container, path).await,
            None => ExitCode::from(EXIT_SUCCESS),
        };
    }

    presenter.update_spinner("Converting and uploading...");
    let output = match pipeline.stop_and_send().await {
        Ok(output) => output,
        Err(e) => return fail(&mut presenter, &e),
    };
    presenter.spinner_success(&format!(
        "Transcription received ({} uploaded)",
        output.container.human_readable_size()
    ));

    presenter.output(&output.transcript.to_pretty_json());

    match &options.output {
        Some(path) => save_container(&presenter, &output.container, path).await,
        None => ExitCode::from(EXIT_SUCCESS),
    }
}

/// Drive the capture until Enter, Ctrl+C, the duration limit, or the stream ends
async fn record_until_stopped(
    pipeline: &mut CliPipeline,
    presenter: &Presenter,
    max_duration: Duration,
) -> StopReason {
    let started = Instant::now();
    let total_ms = max_duration.as_millis() as u64;

    let deadline = tokio::time::sleep(max_duration);
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(PROGRESS_TICK);
    let mut stdin = forward_lines(std::io::BufReader::new(std::io::stdin()));
    let mut stdin_open = true;

    presenter.update_recording_progress(0, total_ms);

    loop {
        tokio::select! {
            line = stdin.recv(), if stdin_open => match line {
                Some(line) if line.trim().eq_ignore_ascii_case(DISCARD_COMMAND) => {
                    return StopReason::Discarded;
                }
                Some(_) => return StopReason::Requested,
                None => stdin_open = false,
            },
            _ = &mut ctrl_c => return StopReason::Interrupted,
            _ = &mut deadline => return StopReason::LimitReached,
            _ = ticker.tick() => {
                presenter.update_recording_progress(started.elapsed().as_millis() as u64, total_ms);
            }
            alive = pipeline.next_event() => {
                if !alive {
                    return StopReason::StreamEnded;
                }
            }
        }
    }
}

/// Read lines on a detached thread and forward them over a channel.
///
/// A pending read cannot be cancelled; on the runtime's blocking pool it
/// would hold up runtime shutdown until the next line arrived.
fn forward_lines<R>(reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("wavscribe-stdin".into())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "stdin unreadable, stop with Ctrl+C");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not watch stdin, stop with Ctrl+C");
    }
    rx
}

/// Convert an audio file to a PCM WAV file
pub async fn run_convert(input: &Path, output: &Path, config: &AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let pipeline = match file_pipeline(config, input) {
        Ok(pipeline) => pipeline,
        Err(e) => return fail(&mut presenter, &e),
    };
    let blob = match read_input(&presenter, input).await {
        Some(blob) => blob,
        None => return ExitCode::from(EXIT_ERROR),
    };

    presenter.start_spinner(&format!("Converting {}...", input.display()));
    let container = match pipeline.convert(blob).await {
        Ok(container) => container,
        Err(e) => return fail(&mut presenter, &e),
    };
    presenter.spinner_success(&format!(
        "Converted: {} ch, {} Hz, {}",
        container.channel_count(),
        container.sample_rate(),
        container.human_readable_size()
    ));

    save_container(&presenter, &container, output).await
}

/// Convert an audio file and upload it
pub async fn run_send(file: &Path, config: &AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let pipeline = match file_pipeline(config, file) {
        Ok(pipeline) => pipeline,
        Err(e) => return fail(&mut presenter, &e),
    };
    let blob = match read_input(&presenter, file).await {
        Some(blob) => blob,
        None => return ExitCode::from(EXIT_ERROR),
    };

    presenter.start_spinner("Converting...");
    let container = match pipeline.convert(blob).await {
        Ok(container) => container,
        Err(e) => return fail(&mut presenter, &e),
    };

    presenter.update_spinner(&format!(
        "Uploading {}...",
        container.human_readable_size()
    ));
    match pipeline.upload(&container).await {
        Ok(transcript) => {
            presenter.spinner_success("Transcription received");
            presenter.output(&transcript.to_pretty_json());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(&mut presenter, &e),
    }
}

/// Load and merge configuration: defaults < file < env < cli
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|e| {
        warn!(error = %e, path = %store.path().display(), "ignoring unreadable config file");
        AppConfig::empty()
    });

    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

/// Config values taken from the environment
pub fn env_config() -> AppConfig {
    AppConfig {
        endpoint: env::var(ENDPOINT_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    }
}

fn build_pipeline(endpoint: &str, timeout: Duration) -> Result<CliPipeline, PipelineError> {
    let transport = HttpTransport::new(endpoint, timeout)?;
    Ok(RecordingPipeline::new(
        CpalCaptureSource::new(),
        SymphoniaDecoder::new(),
        transport,
    ))
}

/// Pipeline for file modes; the decoder is hinted with the file extension
fn file_pipeline(config: &AppConfig, input: &Path) -> Result<CliPipeline, PipelineError> {
    let decoder = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => SymphoniaDecoder::with_extension(ext),
        None => SymphoniaDecoder::new(),
    };
    let transport = HttpTransport::new(config.endpoint_or_default(), config.timeout_or_default())?;
    Ok(RecordingPipeline::new(
        CpalCaptureSource::new(),
        decoder,
        transport,
    ))
}

async fn read_input(presenter: &Presenter, path: &Path) -> Option<Vec<u8>> {
    match fs::read(path).await {
        Ok(blob) => Some(blob),
        Err(e) => {
            presenter.error(&format!("Failed to read {}: {}", path.display(), e));
            None
        }
    }
}

async fn save_container(presenter: &Presenter, container: &PcmContainer, path: &Path) -> ExitCode {
    match fs::write(path, container.as_bytes()).await {
        Ok(()) => {
            presenter.success(&format!("Saved {}", path.display()));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&format!("Failed to write {}: {}", path.display(), e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn fail(presenter: &mut Presenter, err: &PipelineError) -> ExitCode {
    presenter.failure(err);
    ExitCode::from(EXIT_ERROR)
}
