//! Capture session state machine

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::audio::CaptureChunk;

/// Capture session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Stopping,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: &'static str,
}

/// Capture session entity.
/// Owns the chunks buffered during one recording.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> STOPPING (begin_stop)
///   RECORDING -> IDLE (cancel)
///   STOPPING -> IDLE (finish)
///   any -> IDLE (abort)
#[derive(Debug, Default)]
pub struct CaptureSession {
    state: SessionState,
    chunks: Vec<CaptureChunk>,
    started_at: Option<Instant>,
}

impl CaptureSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Check if a stop is in flight
    pub fn is_stopping(&self) -> bool {
        self.state == SessionState::Stopping
    }

    /// Buffered chunks in arrival order
    pub fn chunks(&self) -> &[CaptureChunk] {
        &self.chunks
    }

    /// Total buffered bytes
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(CaptureChunk::len).sum()
    }

    /// Time since the recording started, if one is in progress
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Transition from IDLE to RECORDING with an empty chunk sequence
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect_state(SessionState::Idle, "start recording")?;
        self.chunks.clear();
        self.started_at = Some(Instant::now());
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Buffer a chunk delivered while recording.
    ///
    /// Chunks arriving in any other state are dropped and `false` is returned.
    pub fn on_chunk(&mut self, chunk: CaptureChunk) -> bool {
        if self.state != SessionState::Recording {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    /// Buffer a chunk the source flushed after being told to stop
    pub fn on_flush_chunk(&mut self, chunk: CaptureChunk) -> bool {
        if self.state != SessionState::Stopping {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    /// Transition from RECORDING to STOPPING
    pub fn begin_stop(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect_state(SessionState::Recording, "stop recording")?;
        self.state = SessionState::Stopping;
        Ok(())
    }

    /// Concatenate every buffered chunk into one blob, in arrival order.
    /// Only valid while stopping.
    pub fn take_blob(&mut self) -> Result<Vec<u8>, InvalidStateTransition> {
        self.expect_state(SessionState::Stopping, "collect capture")?;
        let mut blob = Vec::with_capacity(self.buffered_bytes());
        for chunk in self.chunks.drain(..) {
            blob.extend_from_slice(chunk.data());
        }
        Ok(blob)
    }

    /// Transition from RECORDING to IDLE, discarding the capture
    pub fn cancel(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect_state(SessionState::Recording, "cancel recording")?;
        self.reset();
        Ok(())
    }

    /// Transition from STOPPING to IDLE
    pub fn finish(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect_state(SessionState::Stopping, "finish processing")?;
        self.reset();
        Ok(())
    }

    /// Return to IDLE from any state, dropping buffered chunks
    pub fn abort(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.chunks = Vec::new();
        self.started_at = None;
        self.state = SessionState::Idle;
    }

    fn expect_state(
        &self,
        expected: SessionState,
        action: &'static str,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != expected {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action,
            });
        }
        Ok(())
    }
}
