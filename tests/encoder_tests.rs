//! PCM WAV encoder tests against a standard WAV reader

use std::f32::consts::PI;
use std::io::Cursor;

use wavscribe::domain::audio::{encode_wav, DecodedAudio};

fn sine(frames: usize, freq: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    (0..frames)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[test]
fn sine_round_trips_through_hound() {
    let left = sine(4_800, 440.0, 48_000, 0.8);
    let right = sine(4_800, 660.0, 48_000, 0.5);
    let audio = DecodedAudio::new(48_000, vec![left.clone(), right.clone()]).unwrap();

    let container = encode_wav(&audio);
    let mut reader = hound::WavReader::new(Cursor::new(container.into_bytes())).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.duration(), 4_800);

    let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), 4_800 * 2);

    for (frame, pair) in samples.chunks_exact(2).enumerate() {
        for (channel, original) in [&left, &right].iter().enumerate() {
            let scale = if original[frame] < 0.0 { 32768.0 } else { 32767.0 };
            let decoded = f32::from(pair[channel]) / scale;
            assert!(
                (decoded - original[frame]).abs() <= 1.0 / 32767.0,
                "frame {} channel {}: {} vs {}",
                frame,
                channel,
                decoded,
                original[frame]
            );
        }
    }
}

#[test]
fn golden_mono_container() {
    let audio = DecodedAudio::new(8_000, vec![vec![0.0, 1.0, -1.0, 0.5]]).unwrap();
    let bytes = encode_wav(&audio).into_bytes();

    let mut expected = Vec::new();
    expected.extend_from_slice(b"RIFF");
    expected.extend_from_slice(&44u32.to_le_bytes());
    expected.extend_from_slice(b"WAVEfmt ");
    expected.extend_from_slice(&16u32.to_le_bytes());
    expected.extend_from_slice(&1u16.to_le_bytes());
    expected.extend_from_slice(&1u16.to_le_bytes());
    expected.extend_from_slice(&8_000u32.to_le_bytes());
    expected.extend_from_slice(&16_000u32.to_le_bytes());
    expected.extend_from_slice(&2u16.to_le_bytes());
    expected.extend_from_slice(&16u16.to_le_bytes());
    expected.extend_from_slice(b"data");
    expected.extend_from_slice(&8u32.to_le_bytes());
    for sample in [0i16, 32767, -32768, 16384] {
        expected.extend_from_slice(&sample.to_le_bytes());
    }

    assert_eq!(bytes, expected);
}

#[test]
fn out_of_range_samples_saturate() {
    let audio = DecodedAudio::new(16_000, vec![vec![3.5, -7.25, 1.0001, -1.0001]]).unwrap();
    let container = encode_wav(&audio);

    let mut reader = hound::WavReader::new(Cursor::new(container.into_bytes())).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples, vec![32767, -32768, 32767, -32768]);
}

#[test]
fn zero_frames_is_header_only() {
    let audio = DecodedAudio::new(44_100, vec![Vec::new(), Vec::new()]).unwrap();
    let container = encode_wav(&audio);

    assert_eq!(container.len(), 44);
    assert_eq!(container.data_len(), 0);
    assert_eq!(container.riff_len(), 36);

    let reader = hound::WavReader::new(Cursor::new(container.into_bytes())).unwrap();
    assert_eq!(reader.duration(), 0);
    assert_eq!(reader.spec().channels, 2);
}

#[test]
fn length_matches_frames_and_channels() {
    for (channels, frames) in [(1usize, 1usize), (2, 3), (3, 10), (6, 257)] {
        let audio = DecodedAudio::new(22_050, vec![vec![0.1; frames]; channels]).unwrap();
        let container = encode_wav(&audio);
        assert_eq!(container.len(), 44 + frames * channels * 2);
        assert_eq!(container.riff_len() as usize, container.len() - 8);
        assert_eq!(container.frames(), frames);
    }
}
