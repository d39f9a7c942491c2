pub mod capture;
pub mod config;
pub mod error;
pub mod session;
pub mod transcode;
pub mod transmit;

pub use capture::{
    AudioChunk, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource, FileBackend,
    MicrophoneBackend,
};
pub use config::Config;
pub use error::PipelineError;
pub use session::{LogNotifier, Notifier, SessionConfig, SessionState, SessionStats, VoiceSession};
pub use transmit::TranscriptionClient;
