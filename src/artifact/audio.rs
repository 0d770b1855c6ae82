//! The uploaded audio artifact and its status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ArtifactId
// ---------------------------------------------------------------------------

/// Opaque, immutable identifier of an [`AudioArtifact`].
///
/// Also used as the idempotency key of the pipeline orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ArtifactStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an [`AudioArtifact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    /// The file is being uploaded; `progress` is meaningful.
    Uploading,
    /// Upload finished; waiting for transcription.
    Processing,
    /// Ready for, or past, the transcription stage.
    Transcribing,
    /// Prompt optimized; the image is being generated.
    Generating,
    /// Artwork generated (terminal).
    Completed,
    /// A stage failed (terminal).
    Failed,
}

impl ArtifactStatus {
    /// `true` for `Completed` and `Failed`; no stage runs after either.
    ///
    /// ```
    /// use audio_to_art::artifact::ArtifactStatus;
    ///
    /// assert!(ArtifactStatus::Completed.is_terminal());
    /// assert!(ArtifactStatus::Failed.is_terminal());
    /// assert!(!ArtifactStatus::Generating.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, ArtifactStatus::Completed | ArtifactStatus::Failed)
    }

    /// `true` when the orchestrator may start the pipeline for this status.
    pub fn is_trigger(&self) -> bool {
        matches!(self, ArtifactStatus::Processing | ArtifactStatus::Transcribing)
    }

    /// A short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactStatus::Uploading => "Uploading",
            ArtifactStatus::Processing => "Processing",
            ArtifactStatus::Transcribing => "Transcribing",
            ArtifactStatus::Generating => "Generating",
            ArtifactStatus::Completed => "Completed",
            ArtifactStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// AudioArtifact
// ---------------------------------------------------------------------------

/// One user-submitted audio upload tracked through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Assigned at creation; never changes.
    pub id: ArtifactId,
    /// Original file name.
    pub name: String,
    /// Playable locator of the uploaded audio.
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub status: ArtifactStatus,
    /// Upload progress, 0–100. Only meaningful while `Uploading`.
    pub progress: u8,
}

impl AudioArtifact {
    /// Create a new artifact in the `Uploading` state with zero progress.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: ArtifactId::new(),
            name: name.into(),
            url: url.into(),
            created_at: Utc::now(),
            status: ArtifactStatus::Uploading,
            progress: 0,
        }
    }

    /// Return a copy with `progress` advanced to `value` (clamped to 100).
    ///
    /// Returns `None` when the update would move progress backwards or the
    /// artifact is no longer uploading.
    pub fn with_progress(&self, value: u8) -> Option<Self> {
        let value = value.min(100);
        if self.status != ArtifactStatus::Uploading || value < self.progress {
            return None;
        }
        Some(Self {
            progress: value,
            ..self.clone()
        })
    }

    /// Return a copy with `status` replaced.
    pub fn with_status(&self, status: ArtifactStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
