//! Microphone capture source using cpal
//!
//! The input stream lives on a dedicated thread because `cpal::Stream` is
//! not `Send`. The audio callback forwards raw sample batches to that thread,
//! which packs them into chunks and pushes them onto the session channel.
//!
//! Chunk stream layout:
//! - first chunk: IEEE-float WAV header with unknown (`0xFFFFFFFF`) sizes
//! - following chunks: interleaved f32 little-endian samples
//! - terminal [`CaptureEvent::Flushed`] once finalized

use std::sync::mpsc as std_mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::application::ports::{CaptureError, CaptureEvent, CaptureSender, CaptureSource};
use crate::domain::audio::CaptureChunk;

/// Length of audio packed into one chunk
const CHUNK_INTERVAL_MS: u64 = 250;

/// How long the capture thread waits for samples before checking again
const FEED_POLL: Duration = Duration::from_millis(50);

/// Messages from the audio callback and the controller to the capture thread
enum Feed {
    Samples(Vec<f32>),
    StreamError(String),
    Stop { flush: bool },
}

struct ActiveCapture {
    control: std_mpsc::Sender<Feed>,
    thread: JoinHandle<()>,
}

/// Capture source reading the default input device
#[derive(Default)]
pub struct CpalCaptureSource {
    active: Mutex<Option<ActiveCapture>>,
}

impl CpalCaptureSource {
    /// Create a new cpal-based capture source
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a capture thread is running
    pub fn is_open(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Get the default input device
    fn input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no input device found".into()))
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        feed: std_mpsc::Sender<Feed>,
    ) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample,
        f32: cpal::FromSample<T>,
    {
        let error_feed = feed.clone();
        device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples = data.iter().map(|&s| f32::from_sample(s)).collect();
                let _ = feed.send(Feed::Samples(samples));
            },
            move |err| {
                let _ = error_feed.send(Feed::StreamError(err.to_string()));
            },
            None,
        )
    }

    /// Open the device and start the stream. Runs on the capture thread.
    fn start_stream(feed: std_mpsc::Sender<Feed>) -> Result<(cpal::Stream, u16, u32), CaptureError> {
        let device = Self::input_device()?;
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let channels = config.channels;
        let sample_rate = config.sample_rate.0;

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, feed),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, feed),
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, feed),
            SampleFormat::I32 => Self::build_stream::<i32>(&device, &config, feed),
            other => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        Ok((stream, channels, sample_rate))
    }

    /// Capture thread body: forward sample batches as chunks until stopped
    fn run_capture(
        feed_tx: std_mpsc::Sender<Feed>,
        feed_rx: std_mpsc::Receiver<Feed>,
        events: CaptureSender,
        ready: oneshot::Sender<Result<(), CaptureError>>,
    ) {
        let (stream, channels, sample_rate) = match Self::start_stream(feed_tx) {
            Ok(started) => started,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        let _ = ready.send(Ok(()));
        info!(channels, sample_rate, "microphone stream started");

        let opened_at = Instant::now();
        let elapsed_ms = || opened_at.elapsed().as_millis() as u64;
        let header = streamed_float_wav_header(channels, sample_rate);
        if events
            .blocking_send(CaptureEvent::Chunk(CaptureChunk::new(header, 0)))
            .is_err()
        {
            return;
        }

        let chunk_samples =
            (u64::from(sample_rate) * u64::from(channels) * CHUNK_INTERVAL_MS / 1000).max(1) as usize;
        let mut pending: Vec<f32> = Vec::with_capacity(chunk_samples);

        let flush = loop {
            match feed_rx.recv_timeout(FEED_POLL) {
                Ok(Feed::Samples(samples)) => {
                    pending.extend_from_slice(&samples);
                    if pending.len() >= chunk_samples {
                        let chunk = CaptureChunk::new(samples_to_bytes(&pending), elapsed_ms());
                        pending.clear();
                        if events.blocking_send(CaptureEvent::Chunk(chunk)).is_err() {
                            debug!("session dropped the capture channel");
                            return;
                        }
                    }
                }
                Ok(Feed::StreamError(reason)) => {
                    warn!(%reason, "microphone stream error");
                    let _ = events.blocking_send(CaptureEvent::Failed(reason));
                    return;
                }
                Ok(Feed::Stop { flush }) => break flush,
                Err(std_mpsc::RecvTimeoutError::Timeout) => continue,
                Err(std_mpsc::RecvTimeoutError::Disconnected) => break false,
            }
        };

        drop(stream);
        if !flush {
            return;
        }

        // Batches the callback queued before the stream was dropped
        while let Ok(feed) = feed_rx.try_recv() {
            if let Feed::Samples(samples) = feed {
                pending.extend_from_slice(&samples);
            }
        }
        if !pending.is_empty() {
            let chunk = CaptureChunk::new(samples_to_bytes(&pending), elapsed_ms());
            if events.blocking_send(CaptureEvent::Chunk(chunk)).is_err() {
                return;
            }
        }
        let _ = events.blocking_send(CaptureEvent::Flushed);
        info!(elapsed_ms = elapsed_ms(), "microphone stream finalized");
    }

    /// Tell the capture thread to stop. The thread is not awaited: it may be
    /// blocked on a full channel until the session drains it.
    fn shut_down(&self, flush: bool) {
        let active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(active) = active else {
            return;
        };

        let _ = active.control.send(Feed::Stop { flush });
        tokio::task::spawn_blocking(move || {
            if active.thread.join().is_err() {
                warn!("capture thread panicked");
            }
        });
    }
}

#[async_trait]
impl CaptureSource for CpalCaptureSource {
    async fn open(&self, events: CaptureSender) -> Result<(), CaptureError> {
        if self.is_open() {
            return Err(CaptureError::DeviceUnavailable(
                "capture already in progress".into(),
            ));
        }

        let (feed_tx, feed_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let control = feed_tx.clone();

        let thread = std::thread::Builder::new()
            .name("wavscribe-capture".into())
            .spawn(move || Self::run_capture(feed_tx, feed_rx, events, ready_tx))
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        match ready_rx.await {
            Ok(Ok(())) => {
                *self.active.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(ActiveCapture { control, thread });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = tokio::task::spawn_blocking(move || thread.join()).await;
                Err(e)
            }
            Err(_) => Err(CaptureError::DeviceUnavailable(
                "capture thread exited before the stream started".into(),
            )),
        }
    }

    async fn finalize(&self) -> Result<(), CaptureError> {
        self.shut_down(true);
        Ok(())
    }

    async fn close(&self) {
        self.shut_down(false);
    }
}

/// WAV header for an IEEE-float stream whose length is not known yet
pub fn streamed_float_wav_header(channels: u16, sample_rate: u32) -> Vec<u8> {
    const FLOAT_FORMAT_TAG: u16 = 3;
    const BYTES_PER_SAMPLE: u16 = 4;

    let block_align = channels * BYTES_PER_SAMPLE;
    let mut header = Vec::with_capacity(44);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&u32::MAX.to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&16u32.to_le_bytes());
    header.extend_from_slice(&FLOAT_FORMAT_TAG.to_le_bytes());
    header.extend_from_slice(&channels.to_le_bytes());
    header.extend_from_slice(&sample_rate.to_le_bytes());
    header.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
    header.extend_from_slice(&block_align.to_le_bytes());
    header.extend_from_slice(&(BYTES_PER_SAMPLE * 8).to_le_bytes());
    header.extend_from_slice(b"data");
    header.extend_from_slice(&u32::MAX.to_le_bytes());
    header
}

/// Pack float samples as little-endian bytes
fn samples_to_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}
