//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Missing keys fall back to their defaults, so a partial `settings.toml`
//! is valid.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::artifact::{default_styles, ArtStyle, StyleCatalog};

// ---------------------------------------------------------------------------
// ServiceBackend
// ---------------------------------------------------------------------------

/// Selects which implementations back the three pipeline services.
///
/// | Variant | Transcription / optimization / generation        |
/// |---------|---------------------------------------------------|
/// | Demo    | canned random data behind fixed delays (offline)  |
/// | Api     | HTTP endpoints from the service sections below    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceBackend {
    Demo,
    Api,
}

impl Default for ServiceBackend {
    fn default() -> Self {
        Self::Demo
    }
}

// ---------------------------------------------------------------------------
// TranscriptionConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-to-text service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Base URL of the transcription service.
    pub base_url: String,
    /// API key; `None` for services that need no authentication.
    pub api_key: Option<String>,
    pub model: String,
    /// ISO-639-1 code, or `"auto"`.
    pub language: String,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            api_key: None,
            model: "whisper-1".into(),
            language: "auto".into(),
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the prompt-optimization LLM (any OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"qwen2.5:3b"`, `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0). Higher gives more varied prompts.
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.8,
            timeout_secs: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageConfig
// ---------------------------------------------------------------------------

/// Settings for the image-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Requested image size, e.g. `"1024x1024"`.
    pub size: String,
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "dall-e-3".into(),
            size: "1024x1024".into(),
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound for a single stage; an elapsed timeout fails the run.
    pub stage_timeout_secs: u64,
    /// Base latency of the demo backend in milliseconds. Transcription takes
    /// 1×, optimization ½× and generation 1.5× this value.
    pub demo_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_secs: 180,
            demo_delay_ms: 2_000,
        }
    }
}

// ---------------------------------------------------------------------------
// UploadConfig
// ---------------------------------------------------------------------------

/// Upload validation and progress reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Accepted file extensions, without the dot (case insensitive).
    pub allowed_extensions: Vec<String>,
    /// Progress increment per tick, in percent.
    pub progress_step: u8,
    /// Delay between progress ticks.
    pub progress_interval_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["mp3", "wav", "m4a", "aac", "ogg"]
                .into_iter()
                .map(String::from)
                .collect(),
            progress_step: 10,
            progress_interval_ms: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use audio_to_art::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which service implementations to use.
    pub backend: ServiceBackend,
    pub transcription: TranscriptionConfig,
    /// Prompt optimizer settings.
    pub optimizer: LlmConfig,
    pub image: ImageConfig,
    pub pipeline: PipelineConfig,
    pub upload: UploadConfig,
    /// Style catalog; a random entry is used when no style is pinned.
    pub styles: Vec<ArtStyle>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: ServiceBackend::default(),
            transcription: TranscriptionConfig::default(),
            optimizer: LlmConfig::default(),
            image: ImageConfig::default(),
            pipeline: PipelineConfig::default(),
            upload: UploadConfig::default(),
            styles: default_styles(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The configured styles as a catalog.
    pub fn style_catalog(&self) -> StyleCatalog {
        StyleCatalog::new(self.styles.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.backend, loaded.backend);
        assert_eq!(original.transcription.base_url, loaded.transcription.base_url);
        assert_eq!(original.optimizer.model, loaded.optimizer.model);
        assert_eq!(original.optimizer.temperature, loaded.optimizer.temperature);
        assert_eq!(original.image.size, loaded.image.size);
        assert_eq!(
            original.pipeline.stage_timeout_secs,
            loaded.pipeline.stage_timeout_secs
        );
        assert_eq!(
            original.upload.allowed_extensions,
            loaded.upload.allowed_extensions
        );
        assert_eq!(original.styles, loaded.styles);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.backend, ServiceBackend::Demo);
        assert_eq!(config.styles.len(), 5);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "backend = \"api\"\n\n[image]\nmodel = \"sdxl\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.backend, ServiceBackend::Api);
        assert_eq!(config.image.model, "sdxl");
        assert_eq!(config.image.size, "1024x1024");
        assert_eq!(config.optimizer.base_url, "http://localhost:11434");
        assert_eq!(config.upload.progress_step, 10);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.backend, ServiceBackend::Demo);
        assert_eq!(cfg.pipeline.demo_delay_ms, 2_000);
        assert_eq!(cfg.pipeline.stage_timeout_secs, 180);
        assert_eq!(cfg.upload.progress_interval_ms, 300);
        assert!(cfg.upload.allowed_extensions.iter().any(|e| e == "ogg"));
        assert!(cfg.optimizer.api_key.is_none());
        assert_eq!(cfg.style_catalog().default_style().name, "Abstract");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.backend = ServiceBackend::Api;
        cfg.optimizer.api_key = Some("sk-test".into());
        cfg.optimizer.model = "gpt-4o-mini".into();
        cfg.transcription.language = "en".into();
        cfg.styles.truncate(2);

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.backend, ServiceBackend::Api);
        assert_eq!(loaded.optimizer.api_key, Some("sk-test".into()));
        assert_eq!(loaded.optimizer.model, "gpt-4o-mini");
        assert_eq!(loaded.transcription.language, "en");
        assert_eq!(loaded.styles.len(), 2);
    }
}
