pub mod backend;
pub mod file;
pub mod microphone;

pub use backend::{
    AudioChunk, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource,
};
pub use file::FileBackend;
pub use microphone::MicrophoneBackend;
