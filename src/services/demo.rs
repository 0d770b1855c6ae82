//! Offline demo implementations of the three pipeline services.
//!
//! Each call sleeps for a fixed delay and returns randomly chosen canned
//! data, so the whole pipeline can be exercised without any external
//! service. Relative latencies: transcription 1×, optimization ½×,
//! generation 1.5× the configured base delay.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use super::prompt::{apply_template, PROMPT_TEMPLATES};
use super::{ArtGenerator, PromptOptimizer, ServiceError, TranscriptionService};
use crate::artifact::{ArtStyle, ArtifactId, Artwork, Transcription};

const CANNED_TRANSCRIPTIONS: [&str; 5] = [
    "The sunset painted the sky with hues of orange and purple, a masterpiece that no artist could replicate.",
    "Waves crashed against the shore, a rhythmic lullaby that had been playing since the beginning of time.",
    "The forest was alive with the sounds of creatures, a symphony of nature that played day and night.",
    "Stars twinkled in the night sky, diamonds scattered across a canvas of infinite darkness.",
    "The city lights sparkled like fireflies, a man-made constellation that rivaled the stars above.",
];

const IMAGE_QUERY: &str = "?ixlib=rb-1.2.1&auto=format&fit=crop&w=1200&q=80";

/// Sample images per style name; unknown styles use the `Abstract` set.
fn collection_for(style: &str) -> &'static [&'static str] {
    const ABSTRACT: &[&str] = &[
        "photo-1541701494587-cb58502866ab",
        "photo-1507908708918-778587c9e563",
        "photo-1525909002-1b05e0c869d8",
    ];
    match style {
        "Surrealism" => &[
            "photo-1547891654-e66ed7ebb968",
            "photo-1578301978693-85fa9c0320b9",
            "photo-1577083552761-fc7c0d7a5463",
        ],
        "Digital Art" => &[
            "photo-1558591710-4b4a1ae0f04d",
            "photo-1563089145-599997674d42",
            "photo-1518640467707-6811f4a6ab73",
        ],
        "Watercolor" => &[
            "photo-1579783902614-a3fb3927b6a5",
            "photo-1580136579312-94651dfd596d",
            "photo-1574285013029-29296a71930e",
        ],
        "Cyberpunk" => &[
            "photo-1515630278258-407f66498911",
            "photo-1542831371-29b0f74f9713",
            "photo-1504384308090-c894fdcc538d",
        ],
        _ => ABSTRACT,
    }
}

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items.choose(&mut rand::thread_rng()).copied().unwrap_or("")
}

// ---------------------------------------------------------------------------
// DemoTranscriber
// ---------------------------------------------------------------------------

pub struct DemoTranscriber {
    delay: Duration,
}

impl DemoTranscriber {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TranscriptionService for DemoTranscriber {
    async fn transcribe(&self, audio_id: ArtifactId) -> Result<Transcription, ServiceError> {
        tokio::time::sleep(self.delay).await;
        Ok(Transcription::new(audio_id, pick(&CANNED_TRANSCRIPTIONS)))
    }
}

// ---------------------------------------------------------------------------
// DemoOptimizer
// ---------------------------------------------------------------------------

pub struct DemoOptimizer {
    delay: Duration,
}

impl DemoOptimizer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PromptOptimizer for DemoOptimizer {
    async fn optimize(&self, transcription: &Transcription) -> Result<Transcription, ServiceError> {
        tokio::time::sleep(self.delay).await;
        let prompt = apply_template(pick(&PROMPT_TEMPLATES), &transcription.text);
        Ok(transcription.with_optimized_prompt(prompt))
    }
}

// ---------------------------------------------------------------------------
// DemoArtGenerator
// ---------------------------------------------------------------------------

pub struct DemoArtGenerator {
    delay: Duration,
}

impl DemoArtGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ArtGenerator for DemoArtGenerator {
    async fn generate(
        &self,
        transcription: &Transcription,
        style: &ArtStyle,
    ) -> Result<Artwork, ServiceError> {
        tokio::time::sleep(self.delay).await;
        let photo = pick(collection_for(&style.name));
        let url = format!("https://images.unsplash.com/{photo}{IMAGE_QUERY}");
        Ok(Artwork::from_transcription(
            transcription,
            url,
            Some(&style.name),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
