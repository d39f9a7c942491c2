use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use voicecap::{
    CaptureBackendFactory, CaptureSource, Config, SessionConfig, TranscriptionClient, VoiceSession,
};

/// Record speech and resolve it to text via a transcription endpoint.
#[derive(Debug, Parser)]
#[command(name = "voicecap", version)]
struct Cli {
    /// Config file (without extension, as resolved by the config loader)
    #[arg(long, default_value = "config/voicecap")]
    config: String,

    /// Transcribe a compressed audio file instead of the microphone
    #[arg(long)]
    input: Option<String>,

    /// Override the transcription endpoint from the config file
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let endpoint = cli
        .endpoint
        .unwrap_or_else(|| cfg.service.transcription.endpoint.clone());

    info!("{} starting", cfg.service.name);
    info!("Transcription endpoint: {}", endpoint);

    let session_config = SessionConfig {
        sample_rate: cfg.audio.sample_rate,
        channels: cfg.audio.channels,
        chunk_interval_ms: cfg.audio.chunk_interval_ms,
        ..SessionConfig::default()
    };

    let source = match &cli.input {
        Some(path) => CaptureSource::File(path.clone()),
        None => CaptureSource::Microphone,
    };
    let from_microphone = cli.input.is_none();

    let backend = CaptureBackendFactory::create(source, session_config.capture_config())
        .context("Failed to create capture backend")?;

    let client = TranscriptionClient::new(
        endpoint,
        Duration::from_secs(cfg.service.transcription.timeout_secs),
    )?;

    let mut session = VoiceSession::new(session_config, backend, client)
        .on_transcription(|text| println!("{}", text));

    session.start_capture().await;

    if session.state().is_recording() {
        if from_microphone {
            info!("Recording... press Enter to stop");
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read stdin")?;
        } else {
            // Wait for the file source to finish replaying
            while session.source_active() {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }

        session.stop_capture().await;
    }

    let stats = session.stats();
    info!(
        "Session finished: {:.1}s captured, {} chunks",
        stats.duration_secs, stats.chunks_captured
    );

    Ok(())
}
