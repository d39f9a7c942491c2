use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::state::SessionState;
use super::stats::SessionStats;
use crate::capture::CaptureBackend;
use crate::error::PipelineError;
use crate::transcode;
use crate::transmit::TranscriptionClient;

/// The "notify user" side channel: every failure produces exactly one
/// human-readable message through this trait. Presentation is up to the
/// implementation (log line, dialog, toast).
pub trait Notifier: Send + Sync {
    fn notify(&self, error: &PipelineError);
}

/// Default notifier: surfaces the user-facing message via the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, error: &PipelineError) {
        warn!("{}", error.user_message());
    }
}

type TranscriptionCallback = Box<dyn Fn(&str) + Send + Sync>;

/// A voice recording session driving the capture -> transcode -> transmit
/// pipeline. One session may be active per instance; the capture stream is
/// held only while the state is Recording.
pub struct VoiceSession {
    config: SessionConfig,
    backend: Box<dyn CaptureBackend>,
    client: TranscriptionClient,
    notifier: Arc<dyn Notifier>,
    on_transcription: Option<TranscriptionCallback>,

    state: SessionState,
    /// Drains buffered chunks during Recording; yields the concatenated
    /// compressed recording and the chunk count.
    collector: Option<JoinHandle<(Vec<u8>, usize)>>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    chunks_captured: usize,
}

impl VoiceSession {
    pub fn new(
        config: SessionConfig,
        backend: Box<dyn CaptureBackend>,
        client: TranscriptionClient,
    ) -> Self {
        info!("Creating voice session: {}", config.session_id);

        Self {
            config,
            backend,
            client,
            notifier: Arc::new(LogNotifier),
            on_transcription: None,
            state: SessionState::Idle,
            collector: None,
            started_at: None,
            finished_at: None,
            chunks_captured: 0,
        }
    }

    /// Replace the notification side channel.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the completion callback, invoked exactly once per successful
    /// session with the resolved transcription text. Never invoked on failure.
    pub fn on_transcription(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_transcription = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the underlying capture source is still producing chunks.
    pub fn source_active(&self) -> bool {
        self.backend.is_capturing()
    }

    pub fn stats(&self) -> SessionStats {
        let duration_secs = match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => {
                end.signed_duration_since(start).num_milliseconds() as f64 / 1000.0
            }
            (Some(start), None) => {
                Utc::now().signed_duration_since(start).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        };

        SessionStats {
            state: self.state,
            started_at: self.started_at,
            duration_secs,
            chunks_captured: self.chunks_captured,
        }
    }

    /// Start capturing. Rejected while a capture is already in progress: the
    /// active session must be stopped before a new one starts.
    pub async fn start_capture(&mut self) {
        if self.state.is_busy() {
            warn!("Capture already in progress, ignoring start");
            return;
        }

        match self.backend.start().await {
            Ok(mut chunk_rx) => {
                // Buffered chunks are appended here in delivery order and
                // consumed once at stop time.
                let collector = tokio::spawn(async move {
                    let mut buffer = Vec::new();
                    let mut count = 0usize;

                    while let Some(chunk) = chunk_rx.recv().await {
                        buffer.extend_from_slice(&chunk.data);
                        count += 1;
                    }

                    (buffer, count)
                });

                self.collector = Some(collector);
                self.started_at = Some(Utc::now());
                self.finished_at = None;
                self.chunks_captured = 0;
                self.state = SessionState::Recording;

                info!(
                    "Recording started: {} ({})",
                    self.config.session_id,
                    self.backend.name()
                );
            }
            Err(e) => {
                self.state = SessionState::Idle;
                error!("Failed to start capture: {}", e);
                self.notifier.notify(&e);
            }
        }
    }

    /// Stop capturing and run the rest of the pipeline: drain the buffered
    /// chunks, transcode to WAV, upload, resolve the transcript.
    ///
    /// No-op when not recording. The capture stream is released before any
    /// processing begins, on every path.
    pub async fn stop_capture(&mut self) -> Option<String> {
        if !self.state.is_recording() {
            debug!("stop_capture ignored: state is {}", self.state);
            return None;
        }

        // Release the microphone unconditionally; this also closes the chunk
        // channel so the collector drains to completion.
        self.backend.stop().await;
        self.finished_at = Some(Utc::now());
        self.state = SessionState::Processing;

        let (compressed, chunk_count) = match self.collector.take() {
            Some(collector) => match collector.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Chunk collector failed: {}", e);
                    (Vec::new(), 0)
                }
            },
            None => (Vec::new(), 0),
        };

        self.chunks_captured = chunk_count;
        info!(
            "Capture complete: {} chunks, {} bytes",
            chunk_count,
            compressed.len()
        );

        // Decode is CPU-bound; keep it off the async executor.
        let wav = match tokio::task::spawn_blocking(move || transcode::transcode(compressed)).await
        {
            Ok(Ok(wav)) => wav,
            Ok(Err(e)) => return self.fail_decode(e),
            Err(e) => {
                return self.fail_decode(PipelineError::Decode(format!(
                    "transcode task failed: {}",
                    e
                )))
            }
        };

        match self.client.transcribe(wav).await {
            Ok(text) => {
                if let Some(callback) = &self.on_transcription {
                    callback(&text);
                }
                self.state = SessionState::Idle;
                info!("Session complete: {}", self.config.session_id);
                Some(text)
            }
            Err(e) => {
                // The recording itself completed; only the transmission
                // failed, so the session returns to Idle, not Error.
                error!("Transmission failed: {}", e);
                self.notifier.notify(&e);
                self.state = SessionState::Idle;
                None
            }
        }
    }

    /// Decode failure: transient Error state, one notification, then the
    /// session recovers to Idle ready for a new recording.
    fn fail_decode(&mut self, e: PipelineError) -> Option<String> {
        self.state = SessionState::Error;
        error!("Transcode failed: {}", e);
        self.notifier.notify(&e);
        self.state = SessionState::Idle;
        None
    }
}
