//! Domain layer - Core business logic
//!
//! Contains value objects, the capture session state machine, the PCM
//! container encoder and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod session;
pub mod transcript;

// Re-export common types
pub use audio::{encode_wav, CaptureChunk, DecodedAudio, PcmContainer};
pub use config::AppConfig;
pub use error::*;
pub use session::{CaptureSession, InvalidStateTransition, SessionState};
pub use transcript::TranscriptResult;
