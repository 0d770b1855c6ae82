//! Core `PromptOptimizer` trait and `ApiOptimizer` implementation.
//!
//! `ApiOptimizer` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! such as Ollama (OpenAI mode), OpenAI, Groq, LM Studio, vLLM, etc.
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;

use super::http::{authorize, build_client, endpoint, non_empty_str, send_json};
use super::prompt::PromptBuilder;
use super::ServiceError;
use crate::artifact::Transcription;
use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// PromptOptimizer trait
// ---------------------------------------------------------------------------

/// Turns a raw transcription into an image-generation prompt.
///
/// Implementors return the same transcription (same `id`, `audio_id` and
/// `text`) with `optimized_prompt` populated.
#[async_trait]
pub trait PromptOptimizer: Send + Sync {
    async fn optimize(&self, transcription: &Transcription) -> Result<Transcription, ServiceError>;
}

// ---------------------------------------------------------------------------
// ApiOptimizer
// ---------------------------------------------------------------------------

/// Asks an OpenAI-compatible chat model for the prompt.
///
/// The `Authorization: Bearer …` header is attached only when
/// `config.api_key` is a non-empty string, which keeps local providers such
/// as Ollama working without credentials.
pub struct ApiOptimizer {
    client: reqwest::Client,
    config: LlmConfig,
    prompt_builder: PromptBuilder,
}

impl ApiOptimizer {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            config: config.clone(),
            prompt_builder: PromptBuilder::new(),
        }
    }
}

#[async_trait]
impl PromptOptimizer for ApiOptimizer {
    async fn optimize(&self, transcription: &Transcription) -> Result<Transcription, ServiceError> {
        let (system_msg, user_msg) = self.prompt_builder.build_chat(&transcription.text);

        let url = endpoint(&self.config.base_url, "/v1/chat/completions");
        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  300
        });

        let req = authorize(
            self.client.post(&url).json(&body),
            self.config.api_key.as_deref(),
        );
        let json = send_json(req).await?;

        let prompt = non_empty_str(&json["choices"][0]["message"]["content"])?;
        // Models like to wrap the answer in quotes despite the instructions.
        let prompt = prompt.trim_matches('"').trim().to_string();
        if prompt.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }

        Ok(transcription.with_optimized_prompt(prompt))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
