use serde::{Deserialize, Serialize};

use crate::capture::CaptureConfig;

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "recording-<uuid>")
    pub session_id: String,

    /// Sample rate for capture (speech-to-text expects 16kHz)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono)
    pub channels: u16,

    /// Interval between buffered chunk deliveries
    pub chunk_interval_ms: u64,
}

impl SessionConfig {
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
            chunk_interval_ms: self.chunk_interval_ms,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("recording-{}", uuid::Uuid::new_v4()),
            sample_rate: 16000, // speech-to-text expects 16kHz
            channels: 1,        // Mono
            chunk_interval_ms: 100,
        }
    }
}
