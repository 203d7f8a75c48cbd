//! Decoding infrastructure module
//!
//! Turns a concatenated capture blob into planar float samples using
//! symphonia. Streamed WAV headers are repaired before probing.

mod riff;
mod symphonia_decoder;

pub use riff::repair_streamed_wav;
pub use symphonia_decoder::SymphoniaDecoder;
