//! Generated artwork.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ArtifactId, Transcription};

/// An image produced by the generation stage.
///
/// `url` belongs to whichever service produced it; the pipeline never
/// rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: Uuid,
    pub audio_id: ArtifactId,
    pub transcription_id: Uuid,
    pub url: String,
    /// The transcription prompt in effect at generation time. The style is
    /// applied separately (see `styled_prompt`) and is not part of this text.
    pub prompt: String,
    pub style: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Artwork {
    /// Build an artwork for `transcription`, capturing its current prompt.
    pub fn from_transcription(
        transcription: &Transcription,
        url: impl Into<String>,
        style: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            audio_id: transcription.audio_id,
            transcription_id: transcription.id,
            url: url.into(),
            prompt: transcription.prompt().to_string(),
            style: style.map(str::to_string),
            created_at: Utc::now(),
        }
    }
}
