//! Deterministic test doubles with call recording.
//!
//! One [`FakeBackend`] implements all three service traits and appends the
//! name of every call to a shared log, so tests can assert call counts and
//! ordering across stages.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{ArtGenerator, PromptOptimizer, ServiceError, ServiceSet, TranscriptionService};
use crate::artifact::{ArtStyle, ArtifactId, Artwork, Transcription};

pub const TRANSCRIBE: &str = "transcribe";
pub const OPTIMIZE: &str = "optimize";
pub const GENERATE: &str = "generate";

/// Scripted responses for each stage.
pub struct FakeBackend {
    /// Raw transcription text, or the error to return.
    pub transcribe: Result<String, ServiceError>,
    /// Prefix joined to the text with a space, or the error to return.
    pub optimize: Result<String, ServiceError>,
    /// Image URL, or the error to return.
    pub generate: Result<String, ServiceError>,
    /// Latency applied to every call.
    pub delay: Duration,
    log: Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    /// All stages succeed with the given values.
    pub fn ok(text: &str, prefix: &str, url: &str) -> Self {
        Self {
            transcribe: Ok(text.into()),
            optimize: Ok(prefix.into()),
            generate: Ok(url.into()),
            delay: Duration::ZERO,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn happy() -> Self {
        Self::ok("waves crashed", "Create a vibrant...", "https://img/x.png")
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Wrap in an `Arc` and expose as a [`ServiceSet`].
    pub fn into_services(self) -> (Arc<Self>, ServiceSet) {
        let fake = Arc::new(self);
        let services = ServiceSet {
            transcriber: fake.clone(),
            optimizer: fake.clone(),
            generator: fake.clone(),
        };
        (fake, services)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    async fn enter(&self, name: &'static str) {
        self.log.lock().unwrap().push(name);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl TranscriptionService for FakeBackend {
    async fn transcribe(&self, audio_id: ArtifactId) -> Result<Transcription, ServiceError> {
        self.enter(TRANSCRIBE).await;
        let text = self.transcribe.clone()?;
        Ok(Transcription::new(audio_id, text))
    }
}

#[async_trait]
impl PromptOptimizer for FakeBackend {
    async fn optimize(&self, transcription: &Transcription) -> Result<Transcription, ServiceError> {
        self.enter(OPTIMIZE).await;
        let prefix = self.optimize.clone()?;
        Ok(transcription.with_optimized_prompt(format!("{prefix} {}", transcription.text)))
    }
}

#[async_trait]
impl ArtGenerator for FakeBackend {
    async fn generate(
        &self,
        transcription: &Transcription,
        style: &ArtStyle,
    ) -> Result<Artwork, ServiceError> {
        self.enter(GENERATE).await;
        let url = self.generate.clone()?;
        Ok(Artwork::from_transcription(
            transcription,
            url,
            Some(&style.name),
        ))
    }
}
