//! Recording pipeline use case
//!
//! Drives a [`CaptureSession`] from microphone capture through decoding,
//! PCM encoding and upload. Chunks reach the session over a bounded channel;
//! the end of a capture is marked by [`CaptureEvent::Flushed`].

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::domain::audio::{encode_wav, PcmContainer};
use crate::domain::config::DEFAULT_QUEUE_CAPACITY;
use crate::domain::session::{CaptureSession, InvalidStateTransition, SessionState};
use crate::domain::transcript::TranscriptResult;

use super::ports::{
    AudioDecoder, CaptureError, CaptureEvent, CaptureSource, DecodeError, Transport,
    TransportError,
};

/// Errors from the recording pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Recording failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Conversion failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Upload failed: {0}")]
    Transport(#[from] TransportError),
}

impl PipelineError {
    /// Short status line for the user; each failure kind has its own
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "Recorder is busy",
            Self::Capture(CaptureError::DeviceUnavailable(_)) => "Error accessing microphone",
            Self::Capture(CaptureError::StreamFailed(_)) => "Recording interrupted",
            Self::Decode(DecodeError::EmptyCapture) => "Nothing was recorded",
            Self::Decode(DecodeError::UnsupportedFormat(_)) => "Error converting audio",
            Self::Transport(TransportError::NetworkError { .. }) => {
                "Transcription service returned an error"
            }
            Self::Transport(TransportError::TransportFailure(_)) => "Error sending recording",
            Self::Transport(TransportError::InvalidResponse(_)) => {
                "Unexpected response from transcription service"
            }
        }
    }
}

/// Result of a completed capture that was uploaded
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The container that was uploaded
    pub container: PcmContainer,
    /// What the endpoint returned
    pub transcript: TranscriptResult,
}

/// Recording lifecycle: capture, decode, encode and upload
pub struct RecordingPipeline<S, D, T>
where
    S: CaptureSource,
    D: AudioDecoder,
    T: Transport,
{
    source: S,
    decoder: D,
    transport: T,
    session: CaptureSession,
    events: Option<mpsc::Receiver<CaptureEvent>>,
    stream_failure: Option<String>,
    queue_capacity: usize,
}

impl<S, D, T> RecordingPipeline<S, D, T>
where
    S: CaptureSource,
    D: AudioDecoder,
    T: Transport,
{
    /// Create a new pipeline with an idle session
    pub fn new(source: S, decoder: D, transport: T) -> Self {
        Self {
            source,
            decoder,
            transport,
            session: CaptureSession::new(),
            events: None,
            stream_failure: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Set the capacity of the chunk channel used by the next recording
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// The session, for inspection
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Open the capture source and start buffering chunks.
    ///
    /// Fails with `InvalidState` unless idle, and with `DeviceUnavailable`
    /// if the source cannot be opened; the session stays idle in both cases.
    pub async fn start(&mut self) -> Result<(), PipelineError> {
        if !self.session.is_idle() {
            return Err(InvalidStateTransition {
                current_state: self.session.state(),
                action: "start recording",
            }
            .into());
        }

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.source.open(tx).await.map_err(|e| {
            warn!(error = %e, "capture source failed to open");
            e
        })?;

        self.session.start()?;
        self.events = Some(rx);
        self.stream_failure = None;
        info!(queue_capacity = self.queue_capacity, "recording started");
        Ok(())
    }

    /// Move every event already queued on the channel into the session.
    /// Returns the number of chunks buffered.
    pub fn pump(&mut self) -> usize {
        let Some(events) = self.events.as_mut() else {
            return 0;
        };

        let mut accepted = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                CaptureEvent::Chunk(chunk) => {
                    if self.session.on_chunk(chunk) {
                        accepted += 1;
                    }
                }
                CaptureEvent::Flushed => debug!("flush marker received while recording"),
                CaptureEvent::Failed(reason) => {
                    warn!(%reason, "capture stream failed");
                    self.stream_failure = Some(reason);
                }
            }
        }
        accepted
    }

    /// Wait for the next capture event and apply it.
    ///
    /// Returns `false` once the channel is closed, the stream failed, or no
    /// recording is active.
    pub async fn next_event(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };

        match events.recv().await {
            Some(CaptureEvent::Chunk(chunk)) => {
                self.session.on_chunk(chunk);
                true
            }
            Some(CaptureEvent::Flushed) => true,
            Some(CaptureEvent::Failed(reason)) => {
                warn!(%reason, "capture stream failed");
                self.stream_failure = Some(reason);
                false
            }
            None => false,
        }
    }

    /// Stop recording and convert the capture into a PCM container.
    ///
    /// The session returns to idle whether or not conversion succeeds.
    pub async fn stop(&mut self) -> Result<PcmContainer, PipelineError> {
        self.begin_stop()?;
        let result = self
            .capture_to_container()
            .instrument(info_span!("stop"))
            .await;
        self.settle();
        result
    }

    /// Stop recording, convert, and upload the container exactly once.
    ///
    /// The session stays in `Stopping` until the upload settles.
    pub async fn stop_and_send(&mut self) -> Result<PipelineOutput, PipelineError> {
        self.begin_stop()?;
        let result = async {
            let container = self.capture_to_container().await?;
            let transcript = self.upload(&container).await?;
            Ok::<_, PipelineError>(PipelineOutput {
                container,
                transcript,
            })
        }
        .instrument(info_span!("stop_and_send"))
        .await;
        self.settle();
        result
    }

    /// Discard the current recording without decoding it
    pub async fn cancel(&mut self) -> Result<(), PipelineError> {
        self.session.cancel()?;
        self.source.close().await;
        self.events = None;
        self.stream_failure = None;
        info!("recording cancelled");
        Ok(())
    }

    /// Decode and encode an already complete blob, outside any session
    pub async fn convert(&self, blob: Vec<u8>) -> Result<PcmContainer, PipelineError> {
        let audio = self.decoder.decode(blob).await?;
        Ok(encode_wav(&audio))
    }

    /// Upload an existing container
    pub async fn upload(&self, container: &PcmContainer) -> Result<TranscriptResult, PipelineError> {
        info!(size = container.len(), "uploading container");
        let transcript = self.transport.send(container).await.map_err(|e| {
            warn!(error = %e, "upload failed");
            e
        })?;
        Ok(transcript)
    }

    fn begin_stop(&mut self) -> Result<(), PipelineError> {
        self.pump();
        self.session.begin_stop()?;
        Ok(())
    }

    async fn capture_to_container(&mut self) -> Result<PcmContainer, PipelineError> {
        self.source.finalize().await?;

        if let Some(events) = self.events.as_mut() {
            while let Some(event) = events.recv().await {
                match event {
                    CaptureEvent::Chunk(chunk) => {
                        self.session.on_flush_chunk(chunk);
                    }
                    CaptureEvent::Flushed => break,
                    CaptureEvent::Failed(reason) => {
                        self.stream_failure = Some(reason);
                        break;
                    }
                }
            }
        }

        if let Some(reason) = self.stream_failure.take() {
            return Err(CaptureError::StreamFailed(reason).into());
        }

        let chunk_count = self.session.chunks().len();
        let recorded_ms = self
            .session
            .elapsed()
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let blob = self.session.take_blob()?;
        info!(
            chunks = chunk_count,
            bytes = blob.len(),
            recorded_ms,
            "capture finalized"
        );

        let audio = self.decoder.decode(blob).await?;
        debug!(
            channels = audio.channel_count(),
            sample_rate = audio.sample_rate(),
            frames = audio.frames(),
            "capture decoded"
        );

        Ok(encode_wav(&audio))
    }

    fn settle(&mut self) {
        self.events = None;
        self.stream_failure = None;
        if self.session.finish().is_err() {
            self.session.abort();
        }
    }
}
