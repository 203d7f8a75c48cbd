//! Application layer - Use cases and port interfaces
//!
//! Contains the recording pipeline and the trait definitions
//! for external system interactions.

pub mod pipeline;
pub mod ports;

// Re-export use cases
pub use pipeline::{PipelineError, PipelineOutput, RecordingPipeline};
