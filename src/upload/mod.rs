//! Upload flow: validate a local audio file, register it as an artifact,
//! report progress, then hand it to the pipeline.
//!
//! The upload itself is local: the artifact's url is a `file://` locator of
//! the canonical path. Progress ticks in fixed steps so observers see the
//! same `Uploading` phase a remote upload would produce.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::artifact::{ArtifactId, ArtifactStatus, AudioArtifact};
use crate::config::UploadConfig;
use crate::pipeline::{lock, PipelineOrchestrator, ProcessOutcome};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported audio format {extension:?} (allowed: {allowed})")]
    UnsupportedFormat { extension: String, allowed: String },

    #[error("path has no file name: {0}")]
    MissingName(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Uploader
// ---------------------------------------------------------------------------

/// Registers uploads and triggers the pipeline once each upload completes.
pub struct Uploader {
    orchestrator: Arc<PipelineOrchestrator>,
    config: UploadConfig,
}

impl Uploader {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>, config: UploadConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Check that `path` names a file with an accepted extension and return
    /// its file name.
    pub fn validate(&self, path: &Path) -> Result<String, UploadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| UploadError::MissingName(path.display().to_string()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let accepted = self
            .config
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension));
        if !accepted {
            return Err(UploadError::UnsupportedFormat {
                extension,
                allowed: self.config.allowed_extensions.join(", "),
            });
        }

        Ok(name.to_string())
    }

    /// Validate `path` and add it to the store as an `Uploading` artifact.
    pub fn register(&self, path: &Path) -> Result<ArtifactId, UploadError> {
        let name = self.validate(path)?;
        let canonical = std::fs::canonicalize(path).map_err(|source| UploadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let artifact = AudioArtifact::new(name, format!("file://{}", canonical.display()));
        let id = artifact.id;
        log::info!("upload: registered {} as {id}", artifact.name);
        lock(self.orchestrator.state()).add_artifact(artifact);
        Ok(id)
    }

    /// Tick progress up to 100 and mark the artifact ready for processing.
    pub async fn complete(&self, id: ArtifactId) {
        let step = self.config.progress_step.max(1);
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.progress_interval_ms.max(1)));

        let mut progress: u8 = 0;
        while progress < 100 {
            ticker.tick().await;
            progress = progress.saturating_add(step).min(100);
            lock(self.orchestrator.state()).set_progress(id, progress);
            log::debug!("upload: {id} {progress}%");
        }

        lock(self.orchestrator.state()).set_status(id, ArtifactStatus::Transcribing);
    }

    /// Full upload: register, complete, then run the pipeline once.
    pub async fn upload(
        &self,
        path: &Path,
        style: Option<String>,
    ) -> Result<(ArtifactId, ProcessOutcome), UploadError> {
        let id = self.register(path)?;
        self.complete(id).await;
        let outcome = self.orchestrator.process(id, style).await;
        Ok((id, outcome))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
