//! wavscribe - microphone capture to 16-bit PCM WAV, uploaded for transcription
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: capture session state machine, audio value objects, the WAV
//!   encoder, config and errors
//! - **Application**: the recording pipeline and port interfaces (traits)
//! - **Infrastructure**: adapters (cpal capture, symphonia decoding, reqwest upload, TOML config)
//! - **CLI**: argument parsing, output formatting and the runners

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
