//! Symphonia-backed audio decoder

use std::io::{Cursor, ErrorKind};

use async_trait::async_trait;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use super::riff::repair_streamed_wav;
use crate::application::ports::{AudioDecoder, DecodeError};
use crate::domain::audio::DecodedAudio;

/// Decoder for any container/codec pair symphonia was built with
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    extension: Option<String>,
}

impl SymphoniaDecoder {
    /// Create a decoder that probes the blob without hints
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder that hints the probe with a file extension
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: Some(extension.into()),
        }
    }

    /// Decode synchronously. Runs on a blocking worker from [`AudioDecoder::decode`].
    pub fn decode_blocking(&self, mut blob: Vec<u8>) -> Result<DecodedAudio, DecodeError> {
        if blob.is_empty() {
            return Err(DecodeError::EmptyCapture);
        }

        if repair_streamed_wav(&mut blob) {
            debug!("repaired streamed WAV header");
        }

        let mut hint = Hint::new();
        if let Some(ext) = &self.extension {
            hint.with_extension(ext);
        }

        let stream = MediaSourceStream::new(Box::new(Cursor::new(blob)), Default::default());
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(unsupported)?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::UnsupportedFormat("no audio track".into()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channel_count = track.codec_params.channels.map(|c| c.count());

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(unsupported)?;

        let mut interleaved: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(unsupported(e)),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder.decode(&packet).map_err(unsupported)?;
            let spec = *decoded.spec();
            sample_rate = Some(spec.rate);
            channel_count = Some(spec.channels.count());
            if decoded.frames() == 0 {
                continue;
            }

            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }

        let sample_rate = sample_rate
            .ok_or_else(|| DecodeError::UnsupportedFormat("unknown sample rate".into()))?;
        let channel_count = channel_count
            .ok_or_else(|| DecodeError::UnsupportedFormat("unknown channel layout".into()))?;

        DecodedAudio::from_interleaved(sample_rate, channel_count, &interleaved)
            .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))
    }
}

#[async_trait]
impl AudioDecoder for SymphoniaDecoder {
    async fn decode(&self, blob: Vec<u8>) -> Result<DecodedAudio, DecodeError> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode_blocking(blob))
            .await
            .map_err(|e| DecodeError::UnsupportedFormat(format!("Decode task error: {}", e)))?
    }
}

fn unsupported(err: SymphoniaError) -> DecodeError {
    DecodeError::UnsupportedFormat(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::encode_wav;

    /// IEEE-float WAV with unknown sizes, as written by a live capture
    fn streamed_float_wav(channels: u16, sample_rate: u32, samples: &[f32]) -> Vec<u8> {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"RIFF");
        blob.extend_from_slice(&u32::MAX.to_le_bytes());
        blob.extend_from_slice(b"WAVE");
        blob.extend_from_slice(b"fmt ");
        blob.extend_from_slice(&16u32.to_le_bytes());
        blob.extend_from_slice(&3u16.to_le_bytes());
        blob.extend_from_slice(&channels.to_le_bytes());
        blob.extend_from_slice(&sample_rate.to_le_bytes());
        let byte_rate = sample_rate.wrapping_mul(4 * u32::from(channels));
        blob.extend_from_slice(&byte_rate.to_le_bytes());
        blob.extend_from_slice(&(channels * 4).to_le_bytes());
        blob.extend_from_slice(&32u16.to_le_bytes());
        blob.extend_from_slice(b"data");
        blob.extend_from_slice(&u32::MAX.to_le_bytes());
        for sample in samples {
            blob.extend_from_slice(&sample.to_le_bytes());
        }
        blob
    }

    #[test]
    fn empty_blob_is_empty_capture() {
        let err = SymphoniaDecoder::new().decode_blocking(Vec::new()).unwrap_err();
        assert_eq!(err, DecodeError::EmptyCapture);
    }

    #[test]
    fn garbage_is_unsupported() {
        let err = SymphoniaDecoder::new()
            .decode_blocking(b"definitely not audio data".to_vec())
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }

    #[test]
    fn decodes_pcm_container() {
        let original = DecodedAudio::new(16_000, vec![vec![0.5, -0.5, 0.25, 0.0]]).unwrap();
        let container = encode_wav(&original);

        let decoded = SymphoniaDecoder::new()
            .decode_blocking(container.into_bytes())
            .unwrap();
        assert_eq!(decoded.channel_count(), 1);
        assert_eq!(decoded.sample_rate(), 16_000);
        assert_eq!(decoded.frames(), 4);
        for (a, b) in decoded.channel(0).unwrap().iter().zip(original.channel(0).unwrap()) {
            assert!((a - b).abs() <= 1.0 / 32767.0, "{} vs {}", a, b);
        }
    }

    #[test]
    fn decodes_streamed_float_capture() {
        let samples = [0.1f32, -0.1, 0.2, -0.2, 0.3, -0.3];
        let blob = streamed_float_wav(2, 48_000, &samples);

        let decoded = SymphoniaDecoder::new().decode_blocking(blob).unwrap();
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.sample_rate(), 48_000);
        assert_eq!(decoded.channel(0), Some(&[0.1, 0.2, 0.3][..]));
        assert_eq!(decoded.channel(1), Some(&[-0.1, -0.2, -0.3][..]));
    }

    #[test]
    fn non_finite_samples_are_unsupported() {
        let blob = streamed_float_wav(1, 8_000, &[0.0, f32::NAN, 0.0]);
        let err = SymphoniaDecoder::new().decode_blocking(blob).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn async_decode_runs_on_worker() {
        let container = encode_wav(&DecodedAudio::new(8_000, vec![vec![0.0; 16]]).unwrap());
        let decoded = SymphoniaDecoder::with_extension("wav")
            .decode(container.into_bytes())
            .await
            .unwrap();
        assert_eq!(decoded.frames(), 16);
    }

    #[test]
    fn header_too_wide_for_pcm16_is_unsupported() {
        // 16-bit output would need a byte rate of 6 GB/s
        let blob = streamed_float_wav(1, 3_000_000_000, &[0.0, 0.1]);
        let err = SymphoniaDecoder::new().decode_blocking(blob).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }
}
