//! Stage executor: runs one stage against its service.
//!
//! [`StageExecutor`] bounds every service call with the stage timeout,
//! checks the result against the stage contract and folds every problem
//! into a single [`StageFailure`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use super::stage::{Stage, StageState};
use crate::artifact::{ArtStyle, ArtifactId, Artwork, StyleCatalog, Transcription};
use crate::config::AppConfig;
use crate::services::{FailureKind, ServiceError, ServiceSet};

/// Message shown to the user for any failed run.
pub const USER_ERROR_MESSAGE: &str = "An error occurred during processing. Please try again.";

// ---------------------------------------------------------------------------
// StageFailure
// ---------------------------------------------------------------------------

/// A stage did not produce a usable result.
///
/// The orchestrator handles every failure the same way; `kind` is kept for
/// logging and for callers that want their own retry policy.
#[derive(Debug, Clone, Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: ServiceError,
}

impl StageFailure {
    pub fn new(stage: Stage, error: ServiceError) -> Self {
        Self { stage, error }
    }

    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

fn contract(stage: Stage, msg: impl Into<String>) -> StageFailure {
    StageFailure::new(stage, ServiceError::Contract(msg.into()))
}

// ---------------------------------------------------------------------------
// StageExecutor
// ---------------------------------------------------------------------------

/// Invokes the service behind each stage.
pub struct StageExecutor {
    services: ServiceSet,
    styles: StyleCatalog,
    timeout: Duration,
}

impl StageExecutor {
    pub fn new(services: ServiceSet, styles: StyleCatalog, timeout: Duration) -> Self {
        Self {
            services,
            styles,
            timeout,
        }
    }

    /// Services, style catalog and timeout taken from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ServiceSet::from_config(config),
            config.style_catalog(),
            Duration::from_secs(config.pipeline.stage_timeout_secs),
        )
    }

    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    /// Run the stage that follows `state`.
    ///
    /// `style` pins the generation style; `None` picks one at random when
    /// the generation stage runs.
    pub async fn execute(
        &self,
        state: &StageState,
        style: Option<&str>,
    ) -> Result<StageState, StageFailure> {
        match state {
            StageState::Pending { audio_id } => {
                self.transcribe(*audio_id).await.map(StageState::Transcribed)
            }
            StageState::Transcribed(t) => self.optimize(t).await.map(StageState::Optimized),
            StageState::Optimized(t) => {
                let style = self.choose_style(style);
                self.generate(t, &style).await.map(StageState::Generated)
            }
            StageState::Generated(_) => Err(contract(Stage::Generate, "no stage left to run")),
        }
    }

    pub async fn transcribe(&self, audio_id: ArtifactId) -> Result<Transcription, StageFailure> {
        let stage = Stage::Transcribe;
        let t = self
            .bounded(stage, self.services.transcriber.transcribe(audio_id))
            .await?;

        if t.audio_id != audio_id {
            return Err(contract(stage, "transcription references another artifact"));
        }
        if t.text.trim().is_empty() {
            return Err(contract(stage, "transcription text is empty"));
        }
        if t.is_optimized() {
            return Err(contract(stage, "transcription arrived with an optimized prompt"));
        }
        Ok(t)
    }

    pub async fn optimize(&self, raw: &Transcription) -> Result<Transcription, StageFailure> {
        let stage = Stage::Optimize;
        let t = self
            .bounded(stage, self.services.optimizer.optimize(raw))
            .await?;

        if t.id != raw.id || t.audio_id != raw.audio_id || t.text != raw.text {
            return Err(contract(stage, "optimizer changed the transcription"));
        }
        match t.optimized_prompt.as_deref() {
            Some(p) if !p.trim().is_empty() => Ok(t),
            _ => Err(contract(stage, "optimizer returned no prompt")),
        }
    }

    pub async fn generate(
        &self,
        transcription: &Transcription,
        style: &ArtStyle,
    ) -> Result<Artwork, StageFailure> {
        let stage = Stage::Generate;
        let artwork = self
            .bounded(stage, self.services.generator.generate(transcription, style))
            .await?;

        if artwork.audio_id != transcription.audio_id
            || artwork.transcription_id != transcription.id
        {
            return Err(contract(stage, "artwork references another transcription"));
        }
        if artwork.url.trim().is_empty() {
            return Err(contract(stage, "artwork has no url"));
        }
        Ok(artwork)
    }

    /// Pinned styles resolve through the catalog (unknown names fall back to
    /// the default entry); otherwise a uniform random pick.
    fn choose_style(&self, pinned: Option<&str>) -> ArtStyle {
        match pinned {
            Some(key) => self.styles.resolve(Some(key)).clone(),
            None => self.styles.pick_random(&mut rand::thread_rng()).clone(),
        }
    }

    async fn bounded<T>(
        &self,
        stage: Stage,
        call: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, StageFailure> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| StageFailure::new(stage, e)),
            Err(_elapsed) => Err(StageFailure::new(stage, ServiceError::Timeout)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
