//! `ArtGenerator` trait and the OpenAI-compatible image implementation.

use async_trait::async_trait;

use super::http::{authorize, build_client, endpoint, non_empty_str, send_json};
use super::prompt::styled_prompt;
use super::ServiceError;
use crate::artifact::{ArtStyle, Artwork, Transcription};
use crate::config::ImageConfig;

// ---------------------------------------------------------------------------
// ArtGenerator trait
// ---------------------------------------------------------------------------

/// Generates an image for a transcription in the given style.
///
/// The returned artwork references the transcription (and its artifact) and
/// records the prompt in effect at generation time.
#[async_trait]
pub trait ArtGenerator: Send + Sync {
    async fn generate(
        &self,
        transcription: &Transcription,
        style: &ArtStyle,
    ) -> Result<Artwork, ServiceError>;
}

// ---------------------------------------------------------------------------
// ApiArtGenerator
// ---------------------------------------------------------------------------

/// Calls `POST {base_url}/v1/images/generations`.
///
/// Request: `{"model", "prompt", "n": 1, "size"}` with the style folded into
/// the prompt. Response: `{"data": [{"url"}]}`.
pub struct ApiArtGenerator {
    client: reqwest::Client,
    config: ImageConfig,
}

impl ApiArtGenerator {
    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl ArtGenerator for ApiArtGenerator {
    async fn generate(
        &self,
        transcription: &Transcription,
        style: &ArtStyle,
    ) -> Result<Artwork, ServiceError> {
        let url = endpoint(&self.config.base_url, "/v1/images/generations");
        let body = serde_json::json!({
            "model":  self.config.model,
            "prompt": styled_prompt(transcription.prompt(), style),
            "n":      1,
            "size":   self.config.size,
        });

        let req = authorize(
            self.client.post(&url).json(&body),
            self.config.api_key.as_deref(),
        );
        let json = send_json(req).await?;
        let image_url = non_empty_str(&json["data"][0]["url"])?;

        Ok(Artwork::from_transcription(
            transcription,
            image_url,
            Some(&style.name),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
