//! Capture infrastructure module
//!
//! Provides cross-platform microphone capture using cpal.

mod cpal_source;

pub use cpal_source::{streamed_float_wav_header, CpalCaptureSource};
