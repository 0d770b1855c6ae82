//! Pipeline orchestrator module for audio-to-art.
//!
//! This module wires the transcription → prompt optimization → image
//! generation pipeline and exposes the shared store that front ends read to
//! render status, step indicators and the gallery.
//!
//! # Architecture
//!
//! ```text
//! Uploader::complete() ── status = Transcribing
//!        │
//!        ▼
//! PipelineOrchestrator::process(id)        (or PipelineCommand via run())
//!        │
//!        ├─ claim id                        ← idempotency guard
//!        ├─ StageExecutor::execute(Pending)     → Transcribed   (Transcribing)
//!        ├─ StageExecutor::execute(Transcribed) → Optimized     (Generating)
//!        └─ StageExecutor::execute(Optimized)   → Generated     (Completed)
//!
//! SharedState (Arc<Mutex<AppState>>) ←─── read by observers at any time
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use audio_to_art::artifact::ArtifactId;
//! use audio_to_art::config::AppConfig;
//! use audio_to_art::pipeline::{
//!     new_shared_state, PipelineCommand, PipelineOrchestrator, StageExecutor,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let state = new_shared_state();
//!     let orchestrator = Arc::new(PipelineOrchestrator::new(
//!         state.clone(),
//!         StageExecutor::from_config(&config),
//!     ));
//!
//!     let (command_tx, command_rx) = mpsc::channel(16);
//!     let worker = tokio::spawn(orchestrator.run(command_rx));
//!
//!     # let id = ArtifactId::new();
//!     command_tx
//!         .send(PipelineCommand::Process { artifact_id: id, style: None })
//!         .await
//!         .unwrap();
//!     drop(command_tx);
//!     worker.await.unwrap();
//! }
//! ```

pub mod executor;
pub mod runner;
pub mod stage;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use executor::{StageExecutor, StageFailure, USER_ERROR_MESSAGE};
pub use runner::{PipelineCommand, PipelineOrchestrator, ProcessOutcome};
pub use stage::{Stage, StageState};
pub use state::{lock, new_shared_state, AppState, Observation, PipelineStep, SharedState};
