//! Capture chunk value object

/// One arrival unit of encoded capture data.
///
/// The bytes are opaque to the session: only the decoder knows how to
/// interpret them once all chunks have been concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureChunk {
    data: Vec<u8>,
    timestamp_ms: u64,
}

impl CaptureChunk {
    /// Create a chunk from raw bytes and its capture timestamp
    pub fn new(data: Vec<u8>, timestamp_ms: u64) -> Self {
        Self { data, timestamp_ms }
    }

    /// Get the chunk bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Milliseconds since the capture source was opened
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Size of the chunk in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the chunk carries no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_accessors() {
        let chunk = CaptureChunk::new(vec![1, 2, 3], 250);
        assert_eq!(chunk.data(), &[1, 2, 3]);
        assert_eq!(chunk.timestamp_ms(), 250);
        assert_eq!(chunk.len(), 3);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn empty_chunk() {
        let chunk = CaptureChunk::new(Vec::new(), 0);
        assert!(chunk.is_empty());
    }
}
