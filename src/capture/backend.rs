use tokio::sync::mpsc;

use crate::error::PipelineError;

/// One buffered chunk of opaque compressed audio, as produced by the
/// recording primitive. Chunks are delivered in strict temporal order;
/// concatenating their `data` fields yields the full recording.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw compressed bytes (container format is backend-specific)
    pub data: Vec<u8>,
    /// Strictly increasing sequence number within one capture
    pub sequence: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for capture backends
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (16kHz for speech-to-text)
    pub sample_rate: u32,
    /// Target channel count (1 = mono)
    pub channels: u16,
    /// Interval between chunk deliveries in milliseconds
    pub chunk_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz for speech-to-text
            channels: 1,        // Mono
            chunk_interval_ms: 100,
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - Microphone: cpal input stream on a dedicated thread
/// - File: read from a compressed audio file (for testing/batch processing)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio.
    ///
    /// Returns a channel receiver that will receive compressed chunks at the
    /// configured interval. Calling `start` while already capturing must fail
    /// without acquiring a second stream.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, PipelineError>;

    /// Stop capturing and release the input stream. The chunk sender is
    /// dropped so the receiver drains to completion. Must be a no-op when
    /// not capturing.
    async fn stop(&mut self);

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Microphone input via the default input device
    Microphone,
    /// Compressed audio file (for testing/batch processing)
    File(String),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the given source
    pub fn create(
        source: CaptureSource,
        config: CaptureConfig,
    ) -> Result<Box<dyn CaptureBackend>, PipelineError> {
        match source {
            CaptureSource::Microphone => {
                let backend = super::microphone::MicrophoneBackend::new(config);
                Ok(Box::new(backend))
            }
            CaptureSource::File(path) => {
                let backend = super::file::FileBackend::new(path, config);
                Ok(Box::new(backend))
            }
        }
    }
}
