//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces: cpal microphone capture,
//! symphonia decoding, reqwest upload and the TOML config file.

pub mod capture;
pub mod config;
pub mod decoding;
pub mod transport;

// Re-export adapters
pub use capture::CpalCaptureSource;
pub use config::XdgConfigStore;
pub use decoding::SymphoniaDecoder;
pub use transport::HttpTransport;
