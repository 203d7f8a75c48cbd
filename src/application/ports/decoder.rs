//! Audio decoder port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::DecodedAudio;

/// Decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Nothing was captured")]
    EmptyCapture,

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),
}

/// Port for turning a captured blob into planar float samples
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    /// Decode a complete capture blob.
    ///
    /// Produces exactly one result: either the full audio or an error,
    /// never partial output.
    async fn decode(&self, blob: Vec<u8>) -> Result<DecodedAudio, DecodeError>;
}
