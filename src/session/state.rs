use serde::{Deserialize, Serialize};

/// Lifecycle of one recording session. This enum is the single source of
/// truth; any UI affordance derives from it, never the reverse.
///
/// Legal transitions:
/// Idle -> Recording -> Processing -> Idle (success), with a transient
/// detour through Error on decode failure before recovering to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Recording,
    Processing,
    Error,
}

impl SessionState {
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Recording | SessionState::Processing)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Processing => "processing",
            SessionState::Error => "error",
        };
        f.write_str(s)
    }
}
