//! Decoded audio value object

use thiserror::Error;

/// Reasons a set of decoded samples cannot form [`DecodedAudio`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAudioError {
    #[error("Decoded audio has no channels")]
    NoChannels,

    #[error("Decoded audio has a sample rate of 0 Hz")]
    ZeroSampleRate,

    #[error("Channel {channel} has {actual} frames, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite sample in channel {channel} at frame {frame}")]
    NonFiniteSample { channel: usize, frame: usize },

    #[error("{channels} channels exceed the 16-bit WAV channel field")]
    TooManyChannels { channels: usize },

    #[error("Byte rate of {sample_rate} Hz x {channels} channels does not fit a 32-bit field")]
    ByteRateOverflow { sample_rate: u32, channels: usize },

    #[error("{frames} frames x {channels} channels exceed the 4 GiB WAV data limit")]
    DataTooLarge { frames: usize, channels: usize },
}

/// Largest payload a RIFF header can declare next to the 36 header bytes it counts
const MAX_DATA_LEN: u64 = u32::MAX as u64 - 36;

/// Check that a 16-bit PCM WAV header can describe this shape exactly
pub fn check_wav_limits(
    sample_rate: u32,
    channels: usize,
    frames: usize,
) -> Result<(), InvalidAudioError> {
    if channels > usize::from(u16::MAX) {
        return Err(InvalidAudioError::TooManyChannels { channels });
    }
    let byte_rate = u64::from(sample_rate) * 2 * channels as u64;
    if byte_rate > u64::from(u32::MAX) {
        return Err(InvalidAudioError::ByteRateOverflow {
            sample_rate,
            channels,
        });
    }
    let data_len = (frames as u64)
        .checked_mul(channels as u64 * 2)
        .unwrap_or(u64::MAX);
    if data_len > MAX_DATA_LEN {
        return Err(InvalidAudioError::DataTooLarge { frames, channels });
    }
    Ok(())
}

/// Planar floating-point audio produced by the decoder.
///
/// Samples are nominally in `[-1.0, 1.0]` but are not clamped here;
/// clamping is the encoder's job. Every sample is finite, every
/// channel holds exactly `frames()` samples, and the shape fits a
/// 16-bit PCM WAV header.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    sample_rate: u32,
    frames: usize,
    channel_data: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Validate and wrap per-channel sample arrays
    pub fn new(sample_rate: u32, channel_data: Vec<Vec<f32>>) -> Result<Self, InvalidAudioError> {
        if channel_data.is_empty() {
            return Err(InvalidAudioError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(InvalidAudioError::ZeroSampleRate);
        }

        let frames = channel_data[0].len();
        check_wav_limits(sample_rate, channel_data.len(), frames)?;
        for (channel, samples) in channel_data.iter().enumerate() {
            if samples.len() != frames {
                return Err(InvalidAudioError::RaggedChannels {
                    channel,
                    expected: frames,
                    actual: samples.len(),
                });
            }
            if let Some(frame) = samples.iter().position(|s| !s.is_finite()) {
                return Err(InvalidAudioError::NonFiniteSample { channel, frame });
            }
        }

        Ok(Self {
            sample_rate,
            frames,
            channel_data,
        })
    }

    /// Build from interleaved samples (`c0f0, c1f0, c0f1, ...`).
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(
        sample_rate: u32,
        channel_count: usize,
        interleaved: &[f32],
    ) -> Result<Self, InvalidAudioError> {
        if channel_count == 0 {
            return Err(InvalidAudioError::NoChannels);
        }
        let frames = interleaved.len() / channel_count;
        check_wav_limits(sample_rate, channel_count, frames)?;
        let mut channel_data = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in frame.iter().enumerate() {
                channel_data[channel].push(sample);
            }
        }
        Self::new(sample_rate, channel_data)
    }

    /// Number of channels (always at least 1)
    pub fn channel_count(&self) -> usize {
        self.channel_data.len()
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channel_data.get(index).map(Vec::as_slice)
    }

    /// All channels in channel order
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channel_data
    }

    /// Playback length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.frames as u64 * 1000 / u64::from(self.sample_rate)
    }
}
