pub mod config;
pub mod session;
pub mod state;
pub mod stats;

pub use config::SessionConfig;
pub use session::{LogNotifier, Notifier, VoiceSession};
pub use state::SessionState;
pub use stats::SessionStats;
