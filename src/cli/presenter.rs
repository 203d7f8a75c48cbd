//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::PipelineError;

/// Width of the recording progress bar in cells
const BAR_WIDTH: usize = 20;

/// Presenter for CLI output formatting.
/// Status goes to stderr so stdout carries only the transcript.
#[derive(Default)]
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Whether a spinner is currently drawn
    pub fn has_spinner(&self) -> bool {
        self.spinner.is_some()
    }

    /// Finish the spinner with a check mark
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Clear the spinner without a final line
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a pipeline failure: the status line, then the raw detail dimmed.
    /// The spinner is cleared first since it is hidden when stderr is not a terminal.
    pub fn failure(&mut self, err: &PipelineError) {
        self.stop_spinner();
        self.error(err.status_message());
        eprintln!("  {}", err.to_string().dimmed());
    }

    /// Output text to stdout (the transcript JSON)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Recording bar: cells fill towards the auto-stop limit
    pub fn format_progress(&self, elapsed_ms: u64, limit_ms: u64) -> String {
        let filled = if limit_ms == 0 {
            0
        } else {
            (elapsed_ms.min(limit_ms) * BAR_WIDTH as u64 / limit_ms) as usize
        };

        format!(
            "[{}{}] {:>3}s / {}s",
            "█".repeat(filled).cyan(),
            "░".repeat(BAR_WIDTH - filled),
            elapsed_ms / 1000,
            limit_ms / 1000
        )
    }

    /// Redraw the recording line with elapsed time against the limit
    pub fn update_recording_progress(&self, elapsed_ms: u64, limit_ms: u64) {
        let progress = self.format_progress(elapsed_ms, limit_ms);
        self.update_spinner(&format!(
            "Recording... {}  (Enter to stop, q + Enter to discard)",
            progress
        ));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}
