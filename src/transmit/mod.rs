//! Transcription endpoint client.
//!
//! One WAV container goes up as a single multipart field `audio`; the plain
//! text response body comes back as the transcript. No automatic retry: a
//! failed upload means the user records again.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{error, info};

use crate::error::PipelineError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the remote speech-to-text service.
pub struct TranscriptionClient {
    client: Client,
    endpoint: String,
}

impl TranscriptionClient {
    /// Build a client with a bounded request timeout. Timeouts surface as
    /// `PipelineError::Network` like any other connectivity failure.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload one encoded WAV container and resolve the transcribed text.
    pub async fn transcribe(&self, wav: Vec<u8>) -> Result<String, PipelineError> {
        info!(
            "Uploading {} bytes to transcription endpoint {}",
            wav.len(),
            self.endpoint
        );

        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        let form = Form::new().part("audio", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| PipelineError::Network(e.to_string()))?;

            info!("Transcription successful: {} chars", text.chars().count());
            Ok(text)
        } else {
            // Diagnostic body goes to the log, never to the end user.
            let detail = response.text().await.unwrap_or_default();
            error!(
                "Transcription service error ({}): {}",
                status.as_u16(),
                detail
            );

            Err(PipelineError::Service {
                status: status.as_u16(),
                detail,
            })
        }
    }
}
