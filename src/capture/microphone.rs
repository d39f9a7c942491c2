// Microphone capture backend
//
// Owns a cpal input stream on a dedicated thread (cpal streams are not Send,
// the backend trait is). Device samples are converted to 16-bit PCM and
// framed as a streaming WAV: one header chunk up front, then raw
// little-endian sample bytes at the configured chunk interval. The header
// carries placeholder sizes that the transcode stage patches once the full
// recording length is known.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SampleRate, SizedSample, StreamConfig};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use super::backend::{AudioChunk, CaptureBackend, CaptureConfig};
use crate::error::PipelineError;
use crate::transcode::pcm;
use crate::transcode::wav;

const CHUNK_CHANNEL_CAPACITY: usize = 100;

struct ActiveCapture {
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
}

/// Captures from the default input device.
pub struct MicrophoneBackend {
    config: CaptureConfig,
    active: Option<ActiveCapture>,
}

impl MicrophoneBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, PipelineError> {
        if self.active.is_some() {
            // Exclusive resource: this instance already holds the stream.
            return Err(PipelineError::DeviceUnavailable(
                "capture already active".to_string(),
            ));
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();
        let stop = Arc::new(AtomicBool::new(false));

        let config = self.config.clone();
        let thread_stop = Arc::clone(&stop);

        // The stream must be created and dropped on the same thread.
        let handle = thread::spawn(move || {
            capture_thread(config, chunk_tx, ready_tx, thread_stop);
        });

        // Wait for the stream to come up (or fail) before reporting success.
        match ready_rx.await {
            Ok(Ok(())) => {
                info!("Microphone capture started");
                self.active = Some(ActiveCapture {
                    stop,
                    thread: handle,
                });
                Ok(chunk_rx)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(PipelineError::DeviceUnavailable(
                    "capture thread exited before stream start".to_string(),
                ))
            }
        }
    }

    async fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.stop.store(true, Ordering::SeqCst);

            // Joining blocks until the stream is dropped and the device released.
            let join = tokio::task::spawn_blocking(move || active.thread.join());
            match join.await {
                Ok(Ok(())) => info!("Microphone capture stopped"),
                Ok(Err(_)) => error!("Capture thread panicked"),
                Err(e) => error!("Failed to join capture thread: {}", e),
            }
        }
    }

    fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

/// Runs on the dedicated capture thread: builds the stream, reports readiness,
/// then parks until stopped. Dropping the stream releases the device and the
/// chunk sender, which closes the receiver.
fn capture_thread(
    config: CaptureConfig,
    chunk_tx: mpsc::Sender<AudioChunk>,
    ready_tx: oneshot::Sender<Result<(), PipelineError>>,
    stop: Arc<AtomicBool>,
) {
    let stream = match build_stream(&config, chunk_tx) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(PipelineError::PermissionDenied(e.to_string())));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    while !stop.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(25));
    }

    drop(stream);
}

fn build_stream(
    config: &CaptureConfig,
    chunk_tx: mpsc::Sender<AudioChunk>,
) -> Result<cpal::Stream, PipelineError> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| PipelineError::DeviceUnavailable("no default input device".to_string()))?;

    info!(
        "Using audio input device: {}",
        device.name().unwrap_or_else(|_| "<unknown>".to_string())
    );

    let (stream_config, sample_format) = select_config(&device, config)?;

    info!(
        "Capture config: {} Hz, {} channels, {:?}",
        stream_config.sample_rate.0, stream_config.channels, sample_format
    );

    let framer = ChunkFramer::new(
        stream_config.sample_rate.0,
        stream_config.channels,
        config.chunk_interval_ms,
        chunk_tx,
    );

    match sample_format {
        SampleFormat::I16 => build_stream_typed::<i16>(&device, &stream_config, framer),
        SampleFormat::U16 => build_stream_typed::<u16>(&device, &stream_config, framer),
        SampleFormat::F32 => build_stream_typed::<f32>(&device, &stream_config, framer),
        other => Err(PipelineError::DeviceUnavailable(format!(
            "unsupported sample format: {:?}",
            other
        ))),
    }
}

/// Prefer a config matching the requested rate and channel count, fall back to
/// the device default (the WAV header records whatever we actually got).
fn select_config(
    device: &cpal::Device,
    config: &CaptureConfig,
) -> Result<(StreamConfig, SampleFormat), PipelineError> {
    if let Ok(mut supported) = device.supported_input_configs() {
        if let Some(range) = supported.find(|c| {
            c.channels() == config.channels
                && c.min_sample_rate().0 <= config.sample_rate
                && c.max_sample_rate().0 >= config.sample_rate
        }) {
            let chosen = range.with_sample_rate(SampleRate(config.sample_rate));
            let format = chosen.sample_format();
            return Ok((chosen.into(), format));
        }
    }

    let default = device
        .default_input_config()
        .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;
    let format = default.sample_format();
    Ok((default.into(), format))
}

fn build_stream_typed<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut framer: ChunkFramer,
) -> Result<cpal::Stream, PipelineError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let err_fn = |err| error!("Audio stream error: {}", err);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for &sample in data {
                    framer.push(f32::from_sample(sample));
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => {
                PipelineError::DeviceUnavailable("input device disappeared".to_string())
            }
            other => PipelineError::PermissionDenied(other.to_string()),
        })
}

/// Accumulates PCM16 bytes and emits one chunk per interval. The first chunk
/// sent is the streaming WAV header describing the stream layout.
struct ChunkFramer {
    bytes_per_chunk: usize,
    sample_rate: u32,
    channels: u16,
    pending: Vec<u8>,
    sequence: u32,
    samples_emitted: u64,
    header_sent: bool,
    chunk_tx: mpsc::Sender<AudioChunk>,
}

impl ChunkFramer {
    fn new(
        sample_rate: u32,
        channels: u16,
        chunk_interval_ms: u64,
        chunk_tx: mpsc::Sender<AudioChunk>,
    ) -> Self {
        let samples_per_chunk =
            (sample_rate as u64 * channels as u64 * chunk_interval_ms / 1000).max(1);

        Self {
            bytes_per_chunk: samples_per_chunk as usize * 2,
            sample_rate,
            channels,
            pending: Vec::new(),
            sequence: 0,
            samples_emitted: 0,
            header_sent: false,
            chunk_tx,
        }
    }

    fn push(&mut self, sample: f32) {
        if !self.header_sent {
            let header = wav::streaming_header(self.sample_rate, self.channels);
            self.send(header.to_vec());
            self.header_sent = true;
        }

        self.pending
            .extend_from_slice(&pcm::quantize(sample).to_le_bytes());
        self.samples_emitted += 1;

        if self.pending.len() >= self.bytes_per_chunk {
            let data = std::mem::take(&mut self.pending);
            self.send(data);
        }
    }

    fn send(&mut self, data: Vec<u8>) {
        let frames = self.samples_emitted / self.channels as u64;
        let chunk = AudioChunk {
            data,
            sequence: self.sequence,
            timestamp_ms: frames * 1000 / self.sample_rate as u64,
        };

        // Never block the audio callback; drop the chunk if the consumer
        // has fallen 10+ seconds behind.
        if let Err(e) = self.chunk_tx.try_send(chunk) {
            warn!("Dropping audio chunk: {}", e);
        } else {
            self.sequence += 1;
        }
    }
}

impl Drop for ChunkFramer {
    fn drop(&mut self) {
        // Flush whatever is buffered when the stream is torn down.
        if !self.pending.is_empty() {
            let data = std::mem::take(&mut self.pending);
            self.send(data);
        }
    }
}
