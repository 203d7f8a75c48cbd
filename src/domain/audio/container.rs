//! PCM container value object

use std::fmt;

/// Size of the canonical RIFF/WAVE header
pub const WAV_HEADER_LEN: usize = 44;

/// MIME type of the container
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// File name used when uploading the container
pub const WAV_FILE_NAME: &str = "recording.wav";

/// A finished 16-bit PCM WAV byte buffer.
///
/// Only the encoder can build one, so the header always agrees with the
/// payload length.
#[derive(Clone, PartialEq, Eq)]
pub struct PcmContainer {
    bytes: Vec<u8>,
}

impl PcmContainer {
    pub(super) fn from_encoded(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes.len() >= WAV_HEADER_LEN);
        Self { bytes }
    }

    /// Raw container bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the raw container bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// MIME type of the container
    pub const fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }

    /// File name used for uploads
    pub const fn file_name(&self) -> &'static str {
        WAV_FILE_NAME
    }

    /// Total size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Never true; the header is always present
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// RIFF chunk length declared at offset 4
    pub fn riff_len(&self) -> u32 {
        self.read_u32(4)
    }

    /// Channel count declared at offset 22
    pub fn channel_count(&self) -> u16 {
        self.read_u16(22)
    }

    /// Sample rate declared at offset 24
    pub fn sample_rate(&self) -> u32 {
        self.read_u32(24)
    }

    /// Data chunk length declared at offset 40
    pub fn data_len(&self) -> u32 {
        self.read_u32(40)
    }

    /// Number of frames in the payload
    pub fn frames(&self) -> usize {
        match self.channel_count() {
            0 => 0,
            channels => self.data_len() as usize / (usize::from(channels) * 2),
        }
    }

    /// Interleaved sample payload
    pub fn samples(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.len();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    fn read_u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes([
            self.bytes[offset],
            self.bytes[offset + 1],
            self.bytes[offset + 2],
            self.bytes[offset + 3],
        ])
    }
}

impl fmt::Debug for PcmContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcmContainer")
            .field("channels", &self.channel_count())
            .field("sample_rate", &self.sample_rate())
            .field("data_len", &self.data_len())
            .finish()
    }
}
