use thiserror::Error;

/// Failure taxonomy for the capture → transcode → transmit pipeline.
///
/// Every failure is caught at the stage boundary where it occurs and surfaced
/// to the user exactly once through the session's notifier; nothing escapes
/// the pipeline except the success callback.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Microphone access was refused by the user or OS.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    /// No usable audio input device exists.
    #[error("no audio input device available: {0}")]
    DeviceUnavailable(String),

    /// The compressed recording could not be decoded (corrupt or empty).
    #[error("failed to decode recording: {0}")]
    Decode(String),

    /// The transcription endpoint responded with a non-success status.
    /// `detail` is diagnostic text for the log, never shown raw to the user.
    #[error("transcription service returned status {status}")]
    Service { status: u16, detail: String },

    /// The request could not be sent or received at all.
    #[error("network error: {0}")]
    Network(String),
}

impl PipelineError {
    /// Human-readable message appropriate to the failure kind, suitable for
    /// direct display. Service diagnostics are deliberately omitted here.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::PermissionDenied(_) => {
                "Microphone access was denied. Grant permission and try again.".to_string()
            }
            PipelineError::DeviceUnavailable(_) => {
                "No microphone was found. Connect an input device and try again.".to_string()
            }
            PipelineError::Decode(_) => {
                "The recording could not be processed. Please record again.".to_string()
            }
            PipelineError::Service { status, .. } => {
                format!("Transcription failed (service error {}). Please record again.", status)
            }
            PipelineError::Network(_) => {
                "Could not reach the transcription service. Check your connection and record again."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_hides_detail() {
        let err = PipelineError::Service {
            status: 500,
            detail: "stack trace: internal panic at line 42".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("500"));
        assert!(!msg.contains("stack trace"));
    }

    #[test]
    fn display_includes_status() {
        let err = PipelineError::Service {
            status: 503,
            detail: String::new(),
        };
        assert!(err.to_string().contains("503"));
    }
}
