//! Pipeline orchestrator: drives one artifact through transcription,
//! prompt optimization and image generation.
//!
//! [`PipelineOrchestrator`] owns the transition rules and writes every stage
//! result into the [`SharedState`]. It is invoked explicitly, either by
//! calling [`process`](PipelineOrchestrator::process) (the upload flow does
//! this once per upload) or by sending [`PipelineCommand`]s to
//! [`run`](PipelineOrchestrator::run).
//!
//! # Pipeline flow
//!
//! ```text
//! process(id)
//!   ├─ claim id (idempotency guard), already claimed → AlreadyClaimed
//!   ├─ Transcribe  ─ok─▶ record Transcription,  status = Transcribing
//!   ├─ Optimize    ─ok─▶ replace Transcription, status = Generating
//!   ├─ Generate    ─ok─▶ record Artwork,        status = Completed
//!   └─ any failure ────▶ status = Failed, last_error set, stop
//! ```
//!
//! Stages for one artifact never overlap, and each stage's write is in the
//! store before the next stage starts. The store lock is never held across
//! an `.await`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::executor::{StageExecutor, StageFailure, USER_ERROR_MESSAGE};
use super::stage::{Stage, StageState};
use super::state::{lock, SharedState};
use crate::artifact::{ArtifactId, ArtifactStatus, Artwork};
use crate::services::ServiceError;

// ---------------------------------------------------------------------------
// Commands / outcomes
// ---------------------------------------------------------------------------

/// Commands accepted by [`PipelineOrchestrator::run`].
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    /// Start the pipeline for an artifact. `style` pins the art style;
    /// `None` picks one at random.
    Process {
        artifact_id: ArtifactId,
        style: Option<String>,
    },
    /// Release the idempotency claim so the artifact can run again.
    Reset { artifact_id: ArtifactId },
}

/// Result of a [`process`](PipelineOrchestrator::process) call.
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// All stages succeeded.
    Completed(Artwork),
    /// A stage failed; the artifact is `Failed`.
    Failed(StageFailure),
    /// The artifact already ran (or is running) since its last reset.
    AlreadyClaimed,
    /// The artifact is not in a trigger state.
    NotReady(ArtifactStatus),
    UnknownArtifact,
}

impl ProcessOutcome {
    /// `true` if this call actually ran the pipeline.
    pub fn ran(&self) -> bool {
        matches!(self, ProcessOutcome::Completed(_) | ProcessOutcome::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives the processing pipeline for any number of artifacts, one run per
/// artifact id.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use audio_to_art::artifact::AudioArtifact;
/// use audio_to_art::config::AppConfig;
/// use audio_to_art::pipeline::{lock, new_shared_state, PipelineOrchestrator, StageExecutor};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let state = new_shared_state();
/// let orchestrator = Arc::new(PipelineOrchestrator::new(
///     state.clone(),
///     StageExecutor::from_config(&config),
/// ));
///
/// let artifact = AudioArtifact::new("memo.wav", "file:///tmp/memo.wav");
/// let id = artifact.id;
/// lock(&state).add_artifact(artifact);
/// // ... upload finishes ...
/// lock(&state).set_status(id, audio_to_art::artifact::ArtifactStatus::Transcribing);
///
/// let outcome = orchestrator.process(id, None).await;
/// # }
/// ```
pub struct PipelineOrchestrator {
    state: SharedState,
    executor: StageExecutor,
    claimed: Mutex<HashSet<ArtifactId>>,
}

impl PipelineOrchestrator {
    pub fn new(state: SharedState, executor: StageExecutor) -> Self {
        Self {
            state,
            executor,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Command loop
    // -----------------------------------------------------------------------

    /// Handle commands until `command_rx` is closed, then wait for the runs
    /// still in flight.
    ///
    /// Each `Process` command runs on its own task, so different artifacts
    /// progress concurrently.
    pub async fn run(self: Arc<Self>, mut command_rx: mpsc::Receiver<PipelineCommand>) {
        let mut runs = JoinSet::new();

        while let Some(command) = command_rx.recv().await {
            match command {
                PipelineCommand::Process { artifact_id, style } => {
                    let this = Arc::clone(&self);
                    runs.spawn(async move {
                        let outcome = this.process(artifact_id, style).await;
                        log::debug!("pipeline: {artifact_id} finished: {outcome:?}");
                    });
                }
                PipelineCommand::Reset { artifact_id } => {
                    self.reset(artifact_id);
                }
            }
        }

        log::info!(
            "pipeline: command channel closed, waiting for {} run(s)",
            runs.len()
        );
        while let Some(joined) = runs.join_next().await {
            if let Err(e) = joined {
                log::warn!("pipeline: run task panicked: {e}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Single run
    // -----------------------------------------------------------------------

    /// Run the pipeline for `artifact_id` once.
    ///
    /// Repeated calls without an intervening [`reset`](Self::reset) return
    /// [`ProcessOutcome::AlreadyClaimed`] and invoke no service.
    pub async fn process(&self, artifact_id: ArtifactId, style: Option<String>) -> ProcessOutcome {
        if let Err(outcome) = self.claim(artifact_id) {
            log::debug!("pipeline: {artifact_id} not started: {outcome:?}");
            return outcome;
        }

        log::info!("pipeline: {artifact_id} started");

        let mut current = StageState::new(artifact_id);
        while let Some(stage) = current.next_stage() {
            log::debug!("pipeline: {artifact_id} → {stage}");
            lock(&self.state).set_step(artifact_id, stage.step());

            match self.executor.execute(&current, style.as_deref()).await {
                Ok(next) => {
                    self.record(artifact_id, stage, &next);
                    current = next;
                }
                Err(failure) => {
                    self.fail(artifact_id, &failure);
                    return ProcessOutcome::Failed(failure);
                }
            }
        }

        match current.into_artwork() {
            Some(artwork) => {
                log::info!("pipeline: {artifact_id} completed → {}", artwork.url);
                ProcessOutcome::Completed(artwork)
            }
            None => {
                let failure = StageFailure::new(
                    Stage::Generate,
                    ServiceError::Contract("pipeline ended without artwork".into()),
                );
                self.fail(artifact_id, &failure);
                ProcessOutcome::Failed(failure)
            }
        }
    }

    /// Release the claim on `artifact_id` and return a finished artifact to
    /// the trigger state.
    ///
    /// Refused (returns `false`) while a run is in flight or for unknown ids.
    pub fn reset(&self, artifact_id: ArtifactId) -> bool {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if !lock(&self.state).reset_artifact(artifact_id) {
            log::warn!("pipeline: reset of {artifact_id} refused");
            return false;
        }
        claimed.remove(&artifact_id);
        log::debug!("pipeline: {artifact_id} reset");
        true
    }

    pub fn is_claimed(&self, artifact_id: ArtifactId) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&artifact_id)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Claim `artifact_id` and mark its run active.
    ///
    /// Both happen while the claims and store locks are held, so a
    /// concurrent [`reset`](Self::reset) sees the run as active. Lock order
    /// is always claims → store.
    fn claim(&self, artifact_id: ArtifactId) -> Result<(), ProcessOutcome> {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if claimed.contains(&artifact_id) {
            return Err(ProcessOutcome::AlreadyClaimed);
        }

        let mut st = lock(&self.state);
        let status = match st.artifact(artifact_id) {
            Some(artifact) => artifact.status,
            None => return Err(ProcessOutcome::UnknownArtifact),
        };
        if !status.is_trigger() {
            return Err(ProcessOutcome::NotReady(status));
        }

        st.begin_run(artifact_id);
        claimed.insert(artifact_id);
        Ok(())
    }

    /// Publish a stage result and the matching status in one critical section.
    fn record(&self, artifact_id: ArtifactId, stage: Stage, next: &StageState) {
        let mut st = lock(&self.state);
        match next {
            StageState::Transcribed(t) => st.add_transcription(t.clone()),
            StageState::Optimized(t) => {
                if !st.replace_transcription(t.clone()) {
                    log::warn!("pipeline: {artifact_id} transcription {} already optimized", t.id);
                }
            }
            StageState::Generated(artwork) => st.add_artwork(artwork.clone()),
            StageState::Pending { .. } => {}
        }
        st.set_status(artifact_id, stage.status_on_success());
        if next.is_complete() {
            st.finish_run(artifact_id);
        }
    }

    fn fail(&self, artifact_id: ArtifactId, failure: &StageFailure) {
        log::error!(
            "pipeline: {artifact_id} {failure} ({:?})",
            failure.kind()
        );
        let mut st = lock(&self.state);
        st.set_status(artifact_id, ArtifactStatus::Failed);
        st.fail_run(artifact_id, USER_ERROR_MESSAGE);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::artifact::{AudioArtifact, StyleCatalog};
    use crate::pipeline::state::{new_shared_state, PipelineStep};
    use crate::services::fake::{FakeBackend, GENERATE, OPTIMIZE, TRANSCRIBE};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn make_orchestrator(fake: FakeBackend) -> (Arc<PipelineOrchestrator>, Arc<FakeBackend>) {
        let (fake, services) = fake.into_services();
        let executor = StageExecutor::new(services, StyleCatalog::default(), Duration::from_secs(2));
        let orc = Arc::new(PipelineOrchestrator::new(new_shared_state(), executor));
        (orc, fake)
    }

    /// Add an artifact that finished uploading.
    fn ready_artifact(orc: &PipelineOrchestrator, status: ArtifactStatus) -> ArtifactId {
        let artifact = AudioArtifact::new("a1.wav", "file:///a1.wav");
        let id = artifact.id;
        let mut st = lock(orc.state());
        st.add_artifact(artifact);
        st.set_status(id, status);
        id
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn happy_path_completes() {
        let (orc, fake) = make_orchestrator(FakeBackend::happy());
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        let outcome = orc.process(id, Some("Abstract".into())).await;
        let ProcessOutcome::Completed(artwork) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };

        let st = lock(orc.state());
        let obs = st.observe().unwrap();
        assert_eq!(obs.status, ArtifactStatus::Completed);
        assert_eq!(obs.step, PipelineStep::Completed);
        assert!(obs.last_error.is_none());
        assert!(!obs.is_processing);

        assert_eq!(st.transcriptions().len(), 1);
        let t = &st.transcriptions()[0];
        assert_eq!(t.text, "waves crashed");
        assert_eq!(
            t.optimized_prompt.as_deref(),
            Some("Create a vibrant... waves crashed")
        );

        assert_eq!(st.artworks(), &[artwork.clone()]);
        assert_eq!(artwork.url, "https://img/x.png");
        assert_eq!(artwork.style.as_deref(), Some("Abstract"));
        assert_eq!(artwork.prompt, "Create a vibrant... waves crashed");
        assert_eq!(artwork.transcription_id, t.id);

        assert_eq!(fake.calls(), [TRANSCRIBE, OPTIMIZE, GENERATE]);
    }

    #[tokio::test]
    async fn processing_status_also_triggers() {
        let (orc, _) = make_orchestrator(FakeBackend::happy());
        let id = ready_artifact(&orc, ArtifactStatus::Processing);

        assert!(matches!(orc.process(id, None).await, ProcessOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn mid_pipeline_failure_keeps_transcription() {
        let mut fake = FakeBackend::happy();
        fake.optimize = Err(ServiceError::Request("timeout".into()));
        let (orc, fake) = make_orchestrator(fake);
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        let outcome = orc.process(id, None).await;
        let ProcessOutcome::Failed(failure) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(failure.stage, Stage::Optimize);

        let st = lock(orc.state());
        let obs = st.observe().unwrap();
        assert_eq!(obs.status, ArtifactStatus::Failed);
        assert_eq!(obs.last_error.as_deref(), Some(USER_ERROR_MESSAGE));
        assert_eq!(obs.step, PipelineStep::Optimizing);

        assert_eq!(st.transcriptions().len(), 1);
        assert!(st.transcriptions()[0].optimized_prompt.is_none());
        assert!(st.artworks().is_empty());

        assert_eq!(fake.count(GENERATE), 0);
        assert_eq!(fake.calls(), [TRANSCRIBE, OPTIMIZE]);
    }

    #[tokio::test]
    async fn transcription_failure_stops_everything() {
        let mut fake = FakeBackend::happy();
        fake.transcribe = Err(ServiceError::Status {
            status: 500,
            body: "oops".into(),
        });
        let (orc, fake) = make_orchestrator(fake);
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        assert!(matches!(orc.process(id, None).await, ProcessOutcome::Failed(_)));
        assert_eq!(fake.calls(), [TRANSCRIBE]);

        let st = lock(orc.state());
        assert!(st.transcriptions().is_empty());
        assert_eq!(st.artifact(id).unwrap().status, ArtifactStatus::Failed);
    }

    #[tokio::test]
    async fn generation_failure_records_no_artwork() {
        let mut fake = FakeBackend::happy();
        fake.generate = Err(ServiceError::EmptyResponse);
        let (orc, fake) = make_orchestrator(fake);
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        assert!(matches!(orc.process(id, None).await, ProcessOutcome::Failed(_)));
        assert_eq!(fake.calls(), [TRANSCRIBE, OPTIMIZE, GENERATE]);

        let st = lock(orc.state());
        assert!(st.artworks().is_empty());
        assert!(st.transcriptions()[0].is_optimized());
        assert_eq!(st.artifact(id).unwrap().status, ArtifactStatus::Failed);
    }

    #[tokio::test]
    async fn stage_timeout_fails_run() {
        let (fake, services) = FakeBackend::happy()
            .with_delay(Duration::from_millis(200))
            .into_services();
        let executor = StageExecutor::new(services, StyleCatalog::default(), Duration::from_millis(20));
        let orc = PipelineOrchestrator::new(new_shared_state(), executor);
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        let outcome = orc.process(id, None).await;
        assert!(matches!(
            outcome,
            ProcessOutcome::Failed(StageFailure { stage: Stage::Transcribe, error: ServiceError::Timeout })
        ));
        assert_eq!(fake.calls(), [TRANSCRIBE]);
    }

    // -----------------------------------------------------------------------
    // Idempotency / triggers
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn second_trigger_is_ignored() {
        let (orc, fake) = make_orchestrator(FakeBackend::happy());
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        assert!(orc.process(id, None).await.ran());
        assert!(matches!(orc.process(id, None).await, ProcessOutcome::AlreadyClaimed));

        assert_eq!(fake.count(TRANSCRIBE), 1);
        assert_eq!(fake.count(OPTIMIZE), 1);
        assert_eq!(fake.count(GENERATE), 1);
    }

    #[tokio::test]
    async fn concurrent_triggers_run_once() {
        let fake = FakeBackend::happy().with_delay(Duration::from_millis(10));
        let (orc, fake) = make_orchestrator(fake);
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        let (a, b) = tokio::join!(orc.process(id, None), orc.process(id, None));
        assert_eq!([a.ran(), b.ran()].iter().filter(|r| **r).count(), 1);
        assert_eq!(fake.calls(), [TRANSCRIBE, OPTIMIZE, GENERATE]);
    }

    #[tokio::test]
    async fn reset_allows_a_second_run() {
        let (orc, fake) = make_orchestrator(FakeBackend::happy());
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        assert!(orc.process(id, None).await.ran());
        assert!(orc.reset(id));
        assert!(!orc.is_claimed(id));
        assert!(orc.process(id, None).await.ran());

        assert_eq!(fake.count(TRANSCRIBE), 2);
        let st = lock(orc.state());
        assert_eq!(st.transcriptions().len(), 2);
        assert_eq!(st.artworks_for(id).len(), 2);
    }

    #[tokio::test]
    async fn reset_is_refused_once_claimed() {
        let (orc, fake) = make_orchestrator(FakeBackend::happy());
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        // Claimed but no stage has run yet.
        assert!(orc.claim(id).is_ok());
        assert!(lock(orc.state()).is_running(id));

        assert!(!orc.reset(id));
        assert!(orc.is_claimed(id));
        assert!(matches!(orc.process(id, None).await, ProcessOutcome::AlreadyClaimed));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn reset_during_run_is_refused() {
        let fake = FakeBackend::happy().with_delay(Duration::from_millis(50));
        let (orc, fake) = make_orchestrator(fake);
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        let runner = Arc::clone(&orc);
        let task = tokio::spawn(async move { runner.process(id, None).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!orc.reset(id));
        assert!(matches!(orc.process(id, None).await, ProcessOutcome::AlreadyClaimed));
        assert!(task.await.unwrap().ran());
        assert_eq!(fake.count(TRANSCRIBE), 1);
    }

    #[tokio::test]
    async fn uploading_artifact_is_not_ready() {
        let (orc, fake) = make_orchestrator(FakeBackend::happy());
        let id = ready_artifact(&orc, ArtifactStatus::Uploading);

        assert!(matches!(
            orc.process(id, None).await,
            ProcessOutcome::NotReady(ArtifactStatus::Uploading)
        ));
        assert!(!orc.is_claimed(id));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_artifact_is_rejected() {
        let (orc, fake) = make_orchestrator(FakeBackend::happy());
        assert!(matches!(
            orc.process(ArtifactId::new(), None).await,
            ProcessOutcome::UnknownArtifact
        ));
        assert!(fake.calls().is_empty());
    }

    // -----------------------------------------------------------------------
    // Observation / command loop
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn state_is_visible_between_stages() {
        let fake = FakeBackend::happy().with_delay(Duration::from_millis(50));
        let (orc, _) = make_orchestrator(fake);
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);

        let runner = Arc::clone(&orc);
        let task = tokio::spawn(async move { runner.process(id, None).await });

        // Mid-run the store reports an active run on some pipeline step.
        tokio::time::sleep(Duration::from_millis(20)).await;
        {
            let st = lock(orc.state());
            let obs = st.observe().unwrap();
            assert!(obs.is_processing);
            assert!(st.is_processing());
            assert_ne!(obs.step, PipelineStep::Completed);
        }

        assert!(task.await.unwrap().ran());
        assert!(!lock(orc.state()).is_processing());
    }

    #[tokio::test]
    async fn run_loop_processes_each_artifact_once() {
        let (orc, fake) = make_orchestrator(FakeBackend::happy());
        let a = ready_artifact(&orc, ArtifactStatus::Transcribing);
        let b = ready_artifact(&orc, ArtifactStatus::Processing);

        let (tx, rx) = mpsc::channel(8);
        for id in [a, a, b] {
            tx.send(PipelineCommand::Process {
                artifact_id: id,
                style: None,
            })
            .await
            .unwrap();
        }
        drop(tx);

        Arc::clone(&orc).run(rx).await;

        assert_eq!(fake.count(TRANSCRIBE), 2);
        assert_eq!(fake.count(GENERATE), 2);
        let st = lock(orc.state());
        assert_eq!(st.artifact(a).unwrap().status, ArtifactStatus::Completed);
        assert_eq!(st.artifact(b).unwrap().status, ArtifactStatus::Completed);
        assert_eq!(st.gallery().len(), 2);
    }

    #[tokio::test]
    async fn run_loop_reset_command() {
        let (orc, _) = make_orchestrator(FakeBackend::happy());
        let id = ready_artifact(&orc, ArtifactStatus::Transcribing);
        assert!(orc.process(id, None).await.ran());

        let (tx, rx) = mpsc::channel(4);
        tx.send(PipelineCommand::Reset { artifact_id: id }).await.unwrap();
        drop(tx);
        Arc::clone(&orc).run(rx).await;

        assert!(!orc.is_claimed(id));
        assert_eq!(
            lock(orc.state()).artifact(id).unwrap().status,
            ArtifactStatus::Processing
        );
    }
}
