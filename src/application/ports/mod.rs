//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod decoder;
pub mod transport;

// Re-export common types
pub use capture::{CaptureError, CaptureEvent, CaptureSender, CaptureSource};
pub use config::ConfigStore;
pub use decoder::{AudioDecoder, DecodeError};
pub use transport::{Transport, TransportError};
