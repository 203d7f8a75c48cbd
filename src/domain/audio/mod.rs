//! Audio domain module
//!
//! Value objects for each stage of the capture pipeline and the
//! PCM container encoder.

mod chunk;
mod container;
mod decoded;
mod wav_encoder;

pub use chunk::CaptureChunk;
pub use container::{PcmContainer, WAV_FILE_NAME, WAV_HEADER_LEN, WAV_MIME_TYPE};
pub use decoded::{DecodedAudio, InvalidAudioError};
pub use wav_encoder::encode_wav;
