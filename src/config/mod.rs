//! Configuration module for audio-to-art.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each service
//! and for the pipeline, `AppPaths` for cross-platform config directories,
//! and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, ImageConfig, LlmConfig, PipelineConfig, ServiceBackend, TranscriptionConfig,
    UploadConfig,
};
