// File capture backend (for testing/batch processing)
//
// Reads a compressed audio file and replays it as ordered chunks, the same
// shape the microphone backend produces. The file bytes are treated as
// opaque; the transcode stage is what understands the container.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{AudioChunk, CaptureBackend, CaptureConfig};
use crate::error::PipelineError;

const CHUNK_CHANNEL_CAPACITY: usize = 100;

pub struct FileBackend {
    path: PathBuf,
    config: CaptureConfig,
    capturing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>, config: CaptureConfig) -> Self {
        Self {
            path: path.into(),
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Bytes per chunk, sized as if the file carried PCM16 at the configured
    /// rate so chunk cadence roughly matches the configured interval.
    fn chunk_size(&self) -> usize {
        let samples = self.config.sample_rate as u64
            * self.config.channels as u64
            * self.config.chunk_interval_ms
            / 1000;
        (samples as usize * 2).max(1)
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, PipelineError> {
        if self.capturing.load(Ordering::SeqCst) {
            return Err(PipelineError::DeviceUnavailable(
                "capture already active".to_string(),
            ));
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            PipelineError::DeviceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        info!(
            "File capture started: {} ({} bytes)",
            self.path.display(),
            bytes.len()
        );

        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        let chunk_size = self.chunk_size();
        let interval_ms = self.config.chunk_interval_ms;
        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        let task = tokio::spawn(async move {
            let mut sequence: u32 = 0;

            for slice in bytes.chunks(chunk_size) {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let chunk = AudioChunk {
                    data: slice.to_vec(),
                    sequence,
                    timestamp_ms: sequence as u64 * interval_ms,
                };

                if chunk_tx.send(chunk).await.is_err() {
                    warn!("Chunk receiver dropped, stopping file capture");
                    break;
                }

                sequence += 1;
            }

            capturing.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);
        Ok(chunk_rx)
    }

    async fn stop(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("File capture task failed: {}", e);
            }
            info!("File capture stopped");
        }
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
