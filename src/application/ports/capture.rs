//! Capture source port interface

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::audio::CaptureChunk;

/// Capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Microphone unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Capture stream failed: {0}")]
    StreamFailed(String),
}

/// Events a capture source delivers to the session, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A fragment of encoded capture data
    Chunk(CaptureChunk),
    /// Terminal marker sent after the last chunk once the source is finalized
    Flushed,
    /// The stream broke; no further chunks will arrive
    Failed(String),
}

/// Sending half of the bounded channel between a source and the session
pub type CaptureSender = mpsc::Sender<CaptureEvent>;

/// Port for a microphone-like capture source
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Acquire the device and start delivering [`CaptureEvent::Chunk`]s.
    ///
    /// # Errors
    /// [`CaptureError::DeviceUnavailable`] if access is denied or no device exists
    async fn open(&self, events: CaptureSender) -> Result<(), CaptureError>;

    /// Stop capturing, send any remaining data followed by
    /// [`CaptureEvent::Flushed`], then release the device.
    async fn finalize(&self) -> Result<(), CaptureError>;

    /// Release the device without flushing
    async fn close(&self);
}
