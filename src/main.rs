//! Application entry point: audio-to-art.
//!
//! # Startup sequence
//!
//! 1. Parse the command line.
//! 2. Initialise logging.
//! 3. Load [`AppConfig`] from disk (returns default on first run) and apply
//!    command-line overrides.
//! 4. Build the services and the [`PipelineOrchestrator`].
//! 5. Upload each file in order; every upload triggers one pipeline run.
//! 6. Print the per-file result and the gallery.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use audio_to_art::{
    config::{AppConfig, AppPaths, ServiceBackend},
    pipeline::{lock, new_shared_state, PipelineOrchestrator, ProcessOutcome, StageExecutor},
    upload::Uploader,
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Demo,
    Api,
}

impl From<BackendArg> for ServiceBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Demo => ServiceBackend::Demo,
            BackendArg::Api => ServiceBackend::Api,
        }
    }
}

/// Turn audio recordings into generated artwork.
#[derive(Debug, Parser)]
#[command(name = "audio-to-art", version, about)]
struct Cli {
    /// Audio files to process (mp3, wav, m4a, aac, ogg).
    #[arg(required_unless_present = "write_default_config")]
    files: Vec<PathBuf>,

    /// Settings file; defaults to the platform config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Art style name or id; a random style is used when omitted.
    #[arg(long, value_name = "NAME")]
    style: Option<String>,

    /// Override the configured service backend.
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Write the default settings file and exit.
    #[arg(long)]
    write_default_config: bool,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("audio-to-art starting up");

    let settings_file = cli
        .config
        .clone()
        .unwrap_or_else(|| AppPaths::new().settings_file);

    if cli.write_default_config {
        AppConfig::default()
            .save_to(&settings_file)
            .with_context(|| format!("writing {}", settings_file.display()))?;
        println!("wrote {}", settings_file.display());
        return Ok(());
    }

    // Configuration
    let mut config = AppConfig::load_from(&settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if let Some(backend) = cli.backend {
        config.backend = backend.into();
    }

    // Pipeline
    let state = new_shared_state();
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        state.clone(),
        StageExecutor::from_config(&config),
    ));
    let uploader = Uploader::new(Arc::clone(&orchestrator), config.upload.clone());

    let mut failures = 0usize;
    for path in &cli.files {
        match uploader.upload(path, cli.style.clone()).await {
            Ok((id, ProcessOutcome::Completed(artwork))) => {
                println!("{} [{id}] completed", path.display());
                println!("  style:  {}", artwork.style.as_deref().unwrap_or("-"));
                println!("  prompt: {}", artwork.prompt);
                println!("  image:  {}", artwork.url);
            }
            Ok((id, ProcessOutcome::Failed(failure))) => {
                failures += 1;
                let message = lock(&state)
                    .observe_artifact(id)
                    .and_then(|o| o.last_error)
                    .unwrap_or_else(|| failure.to_string());
                println!("{} [{id}] failed: {message}", path.display());
            }
            Ok((id, other)) => {
                failures += 1;
                println!("{} [{id}] not processed: {other:?}", path.display());
            }
            Err(e) => {
                failures += 1;
                log::error!("upload rejected: {e}");
                println!("{} rejected: {e}", path.display());
            }
        }
    }

    // Gallery
    let st = lock(&state);
    let gallery = st.gallery();
    if !gallery.is_empty() {
        println!();
        println!("Gallery ({} artwork(s), newest first)", gallery.len());
        for artwork in gallery {
            println!(
                "  {}  {:<12} {}",
                artwork.created_at.format("%Y-%m-%d %H:%M:%S"),
                artwork.style.as_deref().unwrap_or("-"),
                artwork.url
            );
        }
    }
    drop(st);

    if failures > 0 {
        bail!("{failures} of {} file(s) failed", cli.files.len());
    }
    Ok(())
}
