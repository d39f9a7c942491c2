use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// Statistics about a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Current pipeline state
    pub state: SessionState,

    /// When the most recent capture started (None before the first one)
    pub started_at: Option<DateTime<Utc>>,

    /// Duration of the most recent capture in seconds
    pub duration_secs: f64,

    /// Number of compressed chunks buffered in the most recent capture
    pub chunks_captured: usize,
}
