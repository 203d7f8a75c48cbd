//! Transport port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::PcmContainer;
use crate::domain::transcript::TranscriptResult;

/// Upload errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP {status_code}: {body}")]
    NetworkError { status_code: u16, body: String },

    #[error("Upload failed: {0}")]
    TransportFailure(String),

    #[error("Failed to parse transcription response: {0}")]
    InvalidResponse(String),
}

/// Port for uploading a finished container
#[async_trait]
pub trait Transport: Send + Sync {
    /// Upload the container and return the endpoint's transcript.
    /// Implementations do not retry.
    async fn send(&self, container: &PcmContainer) -> Result<TranscriptResult, TransportError>;
}
