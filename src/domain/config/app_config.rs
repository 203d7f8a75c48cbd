//! Application configuration value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Transcription endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "https://abeens-fusion-ai.hf.space/transcribe";

/// Recording is stopped automatically after this many seconds
pub const DEFAULT_MAX_DURATION_SECS: u64 = 300;

/// Capacity of the bounded capture chunk channel
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub endpoint: Option<String>,
    pub max_duration: Option<u64>,
    pub queue_capacity: Option<usize>,
    pub timeout: Option<u64>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            max_duration: Some(DEFAULT_MAX_DURATION_SECS),
            queue_capacity: Some(DEFAULT_QUEUE_CAPACITY),
            timeout: Some(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            endpoint: other.endpoint.or(self.endpoint),
            max_duration: other.max_duration.or(self.max_duration),
            queue_capacity: other.queue_capacity.or(self.queue_capacity),
            timeout: other.timeout.or(self.timeout),
        }
    }

    /// Get the endpoint, or the default if not set
    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Get the recording limit, or the default if not set or zero
    pub fn max_duration_or_default(&self) -> Duration {
        Duration::from_secs(
            self.max_duration
                .filter(|&secs| secs > 0)
                .unwrap_or(DEFAULT_MAX_DURATION_SECS),
        )
    }

    /// Get the chunk queue capacity, or the default if not set or zero
    pub fn queue_capacity_or_default(&self) -> usize {
        self.queue_capacity
            .filter(|&cap| cap > 0)
            .unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    /// Get the HTTP timeout, or the default if not set or zero
    pub fn timeout_or_default(&self) -> Duration {
        Duration::from_secs(
            self.timeout
                .filter(|&secs| secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }
}
