//! External services consumed by the processing pipeline.
//!
//! This module provides:
//! * [`TranscriptionService`]: speech-to-text for an artifact.
//! * [`PromptOptimizer`]: turns a transcription into an image prompt.
//! * [`ArtGenerator`]: renders an image for a prompt and style.
//! * HTTP implementations ([`ApiTranscriber`], [`ApiOptimizer`],
//!   [`ApiArtGenerator`]) and offline demo implementations
//!   ([`DemoTranscriber`], [`DemoOptimizer`], [`DemoArtGenerator`]).
//! * [`ServiceError`]: error variants shared by all services.
//!
//! Every call is a single attempt; the pipeline decides what a failure
//! means.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audio_to_art::artifact::{ArtifactId, StyleCatalog};
//! use audio_to_art::config::AppConfig;
//! use audio_to_art::services::ServiceSet;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let services = ServiceSet::from_config(&config);
//!
//!     let raw = services.transcriber.transcribe(ArtifactId::new()).await.unwrap();
//!     let optimized = services.optimizer.optimize(&raw).await.unwrap();
//!     let style = StyleCatalog::default();
//!     let artwork = services
//!         .generator
//!         .generate(&optimized, style.default_style())
//!         .await
//!         .unwrap();
//!     println!("{}", artwork.url);
//! }
//! ```

pub mod demo;
pub mod error;
pub mod generator;
pub(crate) mod http;
pub mod optimizer;
pub mod prompt;
pub mod transcriber;

#[cfg(test)]
pub mod fake;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use demo::{DemoArtGenerator, DemoOptimizer, DemoTranscriber};
pub use error::{FailureKind, ServiceError};
pub use generator::{ApiArtGenerator, ArtGenerator};
pub use optimizer::{ApiOptimizer, PromptOptimizer};
pub use prompt::PromptBuilder;
pub use transcriber::{ApiTranscriber, TranscriptionService};

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, ServiceBackend};

// ---------------------------------------------------------------------------
// ServiceSet
// ---------------------------------------------------------------------------

/// The three services the pipeline depends on, each independently
/// replaceable.
#[derive(Clone)]
pub struct ServiceSet {
    pub transcriber: Arc<dyn TranscriptionService>,
    pub optimizer: Arc<dyn PromptOptimizer>,
    pub generator: Arc<dyn ArtGenerator>,
}

impl ServiceSet {
    /// Build the services selected by `config.backend`.
    pub fn from_config(config: &AppConfig) -> Self {
        match config.backend {
            ServiceBackend::Demo => Self::demo(Duration::from_millis(config.pipeline.demo_delay_ms)),
            ServiceBackend::Api => {
                log::info!(
                    "services: api backend (stt={}, llm={}, image={})",
                    config.transcription.base_url,
                    config.optimizer.base_url,
                    config.image.base_url
                );
                Self {
                    transcriber: Arc::new(ApiTranscriber::from_config(&config.transcription)),
                    optimizer: Arc::new(ApiOptimizer::from_config(&config.optimizer)),
                    generator: Arc::new(ApiArtGenerator::from_config(&config.image)),
                }
            }
        }
    }

    /// Demo services with `base` as the transcription latency.
    pub fn demo(base: Duration) -> Self {
        log::info!("services: demo backend (base delay {base:?})");
        Self {
            transcriber: Arc::new(DemoTranscriber::new(base)),
            optimizer: Arc::new(DemoOptimizer::new(base / 2)),
            generator: Arc::new(DemoArtGenerator::new(base * 3 / 2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactId, StyleCatalog};

    #[tokio::test]
    async fn demo_set_runs_end_to_end() {
        let services = ServiceSet::demo(Duration::ZERO);
        let catalog = StyleCatalog::default();

        let raw = services.transcriber.transcribe(ArtifactId::new()).await.unwrap();
        let opt = services.optimizer.optimize(&raw).await.unwrap();
        let art = services
            .generator
            .generate(&opt, catalog.default_style())
            .await
            .unwrap();

        assert_eq!(art.transcription_id, raw.id);
        assert_eq!(art.prompt, opt.optimized_prompt.unwrap());
    }

    #[test]
    fn api_backend_builds_from_default_config() {
        let mut config = AppConfig::default();
        config.backend = ServiceBackend::Api;
        let _services = ServiceSet::from_config(&config);
    }
}
