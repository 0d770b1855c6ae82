//! Speech-to-text output for one artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ArtifactId;

/// Raw transcription text plus, once the optimization stage has run, the
/// image prompt derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub id: Uuid,
    /// Back-reference to the transcribed artifact.
    pub audio_id: ArtifactId,
    pub text: String,
    /// Set only by the optimization stage; immutable once set.
    pub optimized_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transcription {
    /// Create a raw (not yet optimized) transcription.
    pub fn new(audio_id: ArtifactId, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            audio_id,
            text: text.into(),
            optimized_prompt: None,
            created_at: Utc::now(),
        }
    }

    /// Return a copy carrying `prompt` as the optimized prompt.
    pub fn with_optimized_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            optimized_prompt: Some(prompt.into()),
            ..self.clone()
        }
    }

    pub fn is_optimized(&self) -> bool {
        self.optimized_prompt.is_some()
    }

    /// The text used for image generation: the optimized prompt when
    /// present, the raw text otherwise.
    ///
    /// ```
    /// use audio_to_art::artifact::{ArtifactId, Transcription};
    ///
    /// let t = Transcription::new(ArtifactId::new(), "waves crashed");
    /// assert_eq!(t.prompt(), "waves crashed");
    /// assert_eq!(t.with_optimized_prompt("calm sea").prompt(), "calm sea");
    /// ```
    pub fn prompt(&self) -> &str {
        self.optimized_prompt.as_deref().unwrap_or(&self.text)
    }
}
