//! The stage sequence as an explicit state machine.
//!
//! [`StageState`] holds what the pipeline has produced so far; its
//! [`next_stage`](StageState::next_stage) names the stage to run next.
//!
//! ```text
//! Pending ──Transcribe──▶ Transcribed ──Optimize──▶ Optimized ──Generate──▶ Generated
//! ```

use std::fmt;

use super::state::PipelineStep;
use crate::artifact::{ArtifactId, ArtifactStatus, Artwork, Transcription};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One discrete async operation in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Transcribe,
    Optimize,
    Generate,
}

impl Stage {
    /// All stages, in execution order.
    pub const ALL: [Stage; 3] = [Stage::Transcribe, Stage::Optimize, Stage::Generate];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Transcribe => "transcription",
            Stage::Optimize => "prompt optimization",
            Stage::Generate => "image generation",
        }
    }

    /// Step indicator shown while this stage runs.
    pub fn step(&self) -> PipelineStep {
        match self {
            Stage::Transcribe => PipelineStep::Transcribing,
            Stage::Optimize => PipelineStep::Optimizing,
            Stage::Generate => PipelineStep::Generating,
        }
    }

    /// Artifact status written when this stage succeeds.
    pub fn status_on_success(&self) -> ArtifactStatus {
        match self {
            Stage::Transcribe => ArtifactStatus::Transcribing,
            Stage::Optimize => ArtifactStatus::Generating,
            Stage::Generate => ArtifactStatus::Completed,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// StageState
// ---------------------------------------------------------------------------

/// Progress of one pipeline run, carrying the latest stage output.
#[derive(Debug, Clone, PartialEq)]
pub enum StageState {
    /// Nothing has run yet.
    Pending { audio_id: ArtifactId },
    /// Raw transcription recorded.
    Transcribed(Transcription),
    /// Transcription carries its optimized prompt.
    Optimized(Transcription),
    /// Artwork generated; nothing left to run.
    Generated(Artwork),
}

impl StageState {
    pub fn new(audio_id: ArtifactId) -> Self {
        StageState::Pending { audio_id }
    }

    pub fn audio_id(&self) -> ArtifactId {
        match self {
            StageState::Pending { audio_id } => *audio_id,
            StageState::Transcribed(t) | StageState::Optimized(t) => t.audio_id,
            StageState::Generated(a) => a.audio_id,
        }
    }

    /// The stage to run next, or `None` once the artwork exists.
    ///
    /// ```
    /// use audio_to_art::artifact::ArtifactId;
    /// use audio_to_art::pipeline::{Stage, StageState};
    ///
    /// let state = StageState::new(ArtifactId::new());
    /// assert_eq!(state.next_stage(), Some(Stage::Transcribe));
    /// ```
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            StageState::Pending { .. } => Some(Stage::Transcribe),
            StageState::Transcribed(_) => Some(Stage::Optimize),
            StageState::Optimized(_) => Some(Stage::Generate),
            StageState::Generated(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StageState::Generated(_))
    }

    pub fn into_artwork(self) -> Option<Artwork> {
        match self {
            StageState::Generated(artwork) => Some(artwork),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
