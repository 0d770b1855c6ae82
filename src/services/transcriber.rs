//! `TranscriptionService` trait and its HTTP implementation.

use async_trait::async_trait;

use super::http::{authorize, build_client, endpoint, non_empty_str, send_json};
use super::ServiceError;
use crate::artifact::{ArtifactId, Transcription};
use crate::config::TranscriptionConfig;

// ---------------------------------------------------------------------------
// TranscriptionService trait
// ---------------------------------------------------------------------------

/// Speech-to-text for an uploaded artifact.
///
/// Single attempt; retry policy belongs to the caller. The returned
/// transcription must reference `audio_id` and carry no optimized prompt.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(&self, audio_id: ArtifactId) -> Result<Transcription, ServiceError>;
}

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

/// Calls `POST {base_url}/v1/transcriptions` on a service that already holds
/// the uploaded audio, keyed by artifact id.
///
/// Request: `{"audio_id", "model", "language"}`. Response: `{"text"}`.
pub struct ApiTranscriber {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl ApiTranscriber {
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TranscriptionService for ApiTranscriber {
    async fn transcribe(&self, audio_id: ArtifactId) -> Result<Transcription, ServiceError> {
        let url = endpoint(&self.config.base_url, "/v1/transcriptions");
        let body = serde_json::json!({
            "audio_id": audio_id.to_string(),
            "model":    self.config.model,
            "language": self.config.language,
        });

        let req = authorize(
            self.client.post(&url).json(&body),
            self.config.api_key.as_deref(),
        );
        let json = send_json(req).await?;
        let text = non_empty_str(&json["text"])?;

        Ok(Transcription::new(audio_id, text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
