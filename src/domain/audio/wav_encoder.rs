//! 16-bit PCM WAV encoder
//!
//! Layout (all fields little-endian):
//! - `RIFF` + file length - 8 + `WAVE`
//! - `fmt ` chunk: 16 bytes, PCM tag 1, channels, rate, byte rate, block align, 16 bits
//! - `data` chunk: interleaved signed 16-bit samples

use super::container::{PcmContainer, WAV_HEADER_LEN};
use super::decoded::DecodedAudio;

const FMT_CHUNK_LEN: u32 = 16;
const PCM_FORMAT_TAG: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = 2;

/// Write-and-advance cursor over the header region of the output buffer
struct HeaderWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> HeaderWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn tag(&mut self, tag: &[u8; 4]) {
        self.bytes(tag);
    }

    fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn position(&self) -> usize {
        self.pos
    }
}

/// Quantize one float sample to signed 16-bit.
///
/// Negative values scale by 32768 and non-negative values by 32767 so that
/// `-1.0` and `1.0` land exactly on `i16::MIN` and `i16::MAX`.
fn quantize(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled.round() as i32 as i16
}

/// Encode decoded audio into a canonical 44-byte-header PCM WAV container.
///
/// Pure and deterministic. Output length is always
/// `44 + frames * channels * 2`; zero frames yields a header-only container.
pub fn encode_wav(audio: &DecodedAudio) -> PcmContainer {
    let frames = audio.frames();
    let channels = audio.channel_count();
    let data_len = frames * channels * BYTES_PER_SAMPLE;
    let sample_rate = audio.sample_rate();

    // DecodedAudio guarantees every field below fits its header width
    let mut bytes = vec![0u8; WAV_HEADER_LEN + data_len];

    let mut header = HeaderWriter::new(&mut bytes[..WAV_HEADER_LEN]);
    header.tag(b"RIFF");
    header.u32((36 + data_len) as u32);
    header.tag(b"WAVE");
    header.tag(b"fmt ");
    header.u32(FMT_CHUNK_LEN);
    header.u16(PCM_FORMAT_TAG);
    header.u16(channels as u16);
    header.u32(sample_rate);
    header.u32(sample_rate * 2 * channels as u32);
    header.u16((channels * BYTES_PER_SAMPLE) as u16);
    header.u16(BITS_PER_SAMPLE);
    header.tag(b"data");
    header.u32(data_len as u32);
    debug_assert_eq!(header.position(), WAV_HEADER_LEN);

    let payload = &mut bytes[WAV_HEADER_LEN..];
    let sources = audio.channels();
    for frame in 0..frames {
        for (channel, samples) in sources.iter().enumerate() {
            let offset = (frame * channels + channel) * BYTES_PER_SAMPLE;
            payload[offset..offset + BYTES_PER_SAMPLE]
                .copy_from_slice(&quantize(samples[frame]).to_le_bytes());
        }
    }

    PcmContainer::from_encoded(bytes)
}
