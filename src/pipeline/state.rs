//! Pipeline step indicator and the shared application store.
//!
//! [`AppState`] is the single source of truth for everything presentation
//! needs: tracked artifacts, the current artifact, recorded transcriptions
//! and artworks, and per-artifact run progress. Entities are replaced whole
//! by the setter methods, never edited in place by callers.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AppState>>`, cheap to clone
//! and safe to share across tasks. Use [`lock`] to access it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::artifact::{ArtifactId, ArtifactStatus, Artwork, AudioArtifact, Transcription};

// ---------------------------------------------------------------------------
// PipelineStep
// ---------------------------------------------------------------------------

/// Step indicator shown while an artifact moves through the pipeline.
///
/// ```text
/// Uploading(0) ─▶ Transcribing(1) ─▶ Optimizing(2) ─▶ Generating(3) ─▶ Completed(4)
/// ```
///
/// On failure the step stays where the failing stage was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineStep {
    #[default]
    Uploading,
    Transcribing,
    Optimizing,
    Generating,
    Completed,
}

impl PipelineStep {
    /// Zero-based position in the step list.
    ///
    /// ```
    /// use audio_to_art::pipeline::PipelineStep;
    ///
    /// assert_eq!(PipelineStep::Uploading.index(), 0);
    /// assert_eq!(PipelineStep::Completed.index(), 4);
    /// ```
    pub fn index(&self) -> u8 {
        match self {
            PipelineStep::Uploading => 0,
            PipelineStep::Transcribing => 1,
            PipelineStep::Optimizing => 2,
            PipelineStep::Generating => 3,
            PipelineStep::Completed => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStep::Uploading => "Uploading Audio",
            PipelineStep::Transcribing => "Transcribing",
            PipelineStep::Optimizing => "Optimizing",
            PipelineStep::Generating => "Generating Art",
            PipelineStep::Completed => "Completed",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PipelineStep::Uploading => "Preparing your audio file",
            PipelineStep::Transcribing => "Converting speech to text",
            PipelineStep::Optimizing => "Enhancing prompt for best results",
            PipelineStep::Generating => "Creating your unique artwork",
            PipelineStep::Completed => "Your artwork is ready!",
        }
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// Read-only snapshot of one artifact's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub artifact_id: ArtifactId,
    pub status: ArtifactStatus,
    pub progress: u8,
    pub step: PipelineStep,
    /// Human-readable message when the last run failed.
    pub last_error: Option<String>,
    /// `true` while a pipeline run for this artifact is in flight.
    pub is_processing: bool,
}

#[derive(Debug, Clone, Default)]
struct RunRecord {
    step: PipelineStep,
    error: Option<String>,
    active: bool,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Client-side state container.
///
/// Held behind [`SharedState`]. The orchestrator and the upload flow write
/// it; presentation reads it through [`AppState::observe`] and
/// [`AppState::gallery`].
#[derive(Debug, Default)]
pub struct AppState {
    artifacts: Vec<AudioArtifact>,
    current: Option<ArtifactId>,
    transcriptions: Vec<Transcription>,
    artworks: Vec<Artwork>,
    runs: HashMap<ArtifactId, RunRecord>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Artifacts
    // -----------------------------------------------------------------------

    /// Track a new artifact. The first artifact added becomes current.
    pub fn add_artifact(&mut self, artifact: AudioArtifact) {
        if self.current.is_none() {
            self.current = Some(artifact.id);
        }
        self.artifacts.push(artifact);
    }

    pub fn artifact(&self, id: ArtifactId) -> Option<&AudioArtifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    pub fn artifacts(&self) -> &[AudioArtifact] {
        &self.artifacts
    }

    pub fn current(&self) -> Option<&AudioArtifact> {
        self.current.and_then(|id| self.artifact(id))
    }

    /// Make `id` the current artifact. Returns `false` for unknown ids.
    pub fn set_current(&mut self, id: ArtifactId) -> bool {
        if self.artifact(id).is_none() {
            return false;
        }
        self.current = Some(id);
        true
    }

    /// Advance upload progress; backwards moves and updates after the upload
    /// finished are ignored.
    pub fn set_progress(&mut self, id: ArtifactId, progress: u8) -> bool {
        self.replace_artifact(id, |a| a.with_progress(progress))
    }

    pub fn set_status(&mut self, id: ArtifactId, status: ArtifactStatus) -> bool {
        self.replace_artifact(id, |a| Some(a.with_status(status)))
    }

    fn replace_artifact(
        &mut self,
        id: ArtifactId,
        update: impl FnOnce(&AudioArtifact) -> Option<AudioArtifact>,
    ) -> bool {
        let Some(slot) = self.artifacts.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        match update(slot) {
            Some(updated) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Transcriptions
    // -----------------------------------------------------------------------

    pub fn add_transcription(&mut self, transcription: Transcription) {
        self.transcriptions.push(transcription);
    }

    /// Replace the recorded transcription with the same id.
    ///
    /// Refuses (returns `false`) when the recorded one already carries an
    /// optimized prompt. Unknown ids are appended.
    pub fn replace_transcription(&mut self, transcription: Transcription) -> bool {
        match self
            .transcriptions
            .iter_mut()
            .find(|t| t.id == transcription.id)
        {
            Some(slot) if slot.is_optimized() => false,
            Some(slot) => {
                *slot = transcription;
                true
            }
            None => {
                self.transcriptions.push(transcription);
                true
            }
        }
    }

    pub fn transcriptions(&self) -> &[Transcription] {
        &self.transcriptions
    }

    /// Most recent transcription recorded for an artifact.
    pub fn transcription_for(&self, audio_id: ArtifactId) -> Option<&Transcription> {
        self.transcriptions
            .iter()
            .rev()
            .find(|t| t.audio_id == audio_id)
    }

    // -----------------------------------------------------------------------
    // Artworks
    // -----------------------------------------------------------------------

    pub fn add_artwork(&mut self, artwork: Artwork) {
        self.artworks.push(artwork);
    }

    pub fn artworks(&self) -> &[Artwork] {
        &self.artworks
    }

    pub fn artworks_for(&self, audio_id: ArtifactId) -> Vec<&Artwork> {
        self.artworks
            .iter()
            .filter(|a| a.audio_id == audio_id)
            .collect()
    }

    /// All artworks, newest first.
    pub fn gallery(&self) -> Vec<&Artwork> {
        let mut items: Vec<&Artwork> = self.artworks.iter().collect();
        // Stable sort keeps insertion order for equal timestamps; reverse
        // afterwards so later insertions come first among ties too.
        items.sort_by_key(|a| a.created_at);
        items.reverse();
        items
    }

    // -----------------------------------------------------------------------
    // Run bookkeeping
    // -----------------------------------------------------------------------

    /// Mark a run as started, clearing any previous error.
    pub fn begin_run(&mut self, id: ArtifactId) {
        self.runs.insert(
            id,
            RunRecord {
                step: PipelineStep::Transcribing,
                error: None,
                active: true,
            },
        );
    }

    pub fn set_step(&mut self, id: ArtifactId, step: PipelineStep) {
        self.runs.entry(id).or_default().step = step;
    }

    pub fn finish_run(&mut self, id: ArtifactId) {
        let run = self.runs.entry(id).or_default();
        run.step = PipelineStep::Completed;
        run.active = false;
    }

    pub fn fail_run(&mut self, id: ArtifactId, message: impl Into<String>) {
        let run = self.runs.entry(id).or_default();
        run.error = Some(message.into());
        run.active = false;
    }

    pub fn is_running(&self, id: ArtifactId) -> bool {
        self.runs.get(&id).is_some_and(|r| r.active)
    }

    /// `true` while any run is in flight.
    pub fn is_processing(&self) -> bool {
        self.runs.values().any(|r| r.active)
    }

    /// Return a finished artifact to the trigger state so it can run again.
    ///
    /// Recorded transcriptions and artworks are kept. Returns `false` for
    /// unknown ids and for artifacts with a run in flight.
    pub fn reset_artifact(&mut self, id: ArtifactId) -> bool {
        if self.is_running(id) {
            return false;
        }
        let known = self.replace_artifact(id, |a| {
            let status = if a.status.is_terminal() {
                ArtifactStatus::Processing
            } else {
                a.status
            };
            Some(a.with_status(status))
        });
        if known {
            self.runs.remove(&id);
        }
        known
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Snapshot of the current artifact.
    pub fn observe(&self) -> Option<Observation> {
        self.current.and_then(|id| self.observe_artifact(id))
    }

    pub fn observe_artifact(&self, id: ArtifactId) -> Option<Observation> {
        let artifact = self.artifact(id)?;
        let run = self.runs.get(&id).cloned().unwrap_or_default();
        Some(Observation {
            artifact_id: id,
            status: artifact.status,
            progress: artifact.progress,
            step: run.step,
            last_error: run.error,
            is_processing: run.active,
        })
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Cheap to clone (`Arc` clone). Hold the lock for a short critical section
/// only; never across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new, empty [`SharedState`].
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(AppState::new()))
}

/// Lock the store, recovering from poisoning.
///
/// Every write replaces whole entities, so a panic in another holder cannot
/// leave a half-updated entity behind.
pub fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
