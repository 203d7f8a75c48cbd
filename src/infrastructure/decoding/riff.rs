//! Streamed RIFF/WAVE header repair
//!
//! A writer that cannot seek back (a live capture, a pipe) leaves the RIFF
//! and `data` size fields as `0` or `0xFFFFFFFF`. Those sizes are patched to
//! match the bytes actually present.

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Patch the RIFF and `data` chunk lengths of a WAV blob in place.
///
/// Returns `true` if anything was changed. Blobs that are not RIFF/WAVE
/// are left untouched.
pub fn repair_streamed_wav(blob: &mut [u8]) -> bool {
    if blob.len() < RIFF_HEADER_LEN || &blob[0..4] != b"RIFF" || &blob[8..12] != b"WAVE" {
        return false;
    }

    let mut changed = false;
    let total = blob.len();

    let actual_riff = clamp_u32(total - 8);
    if read_u32(blob, 4) != actual_riff {
        write_u32(blob, 4, actual_riff);
        changed = true;
    }

    let mut pos = RIFF_HEADER_LEN;
    while pos + CHUNK_HEADER_LEN <= total {
        let declared = read_u32(blob, pos + 4);
        let available = total - pos - CHUNK_HEADER_LEN;

        if &blob[pos..pos + 4] == b"data" {
            if declared == 0 || declared as usize > available {
                write_u32(blob, pos + 4, clamp_u32(available));
                changed = true;
            }
            break;
        }

        // Chunks are word aligned
        let padded = declared as usize + (declared as usize & 1);
        match pos.checked_add(CHUNK_HEADER_LEN + padded) {
            Some(next) => pos = next,
            None => break,
        }
    }

    changed
}

fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
