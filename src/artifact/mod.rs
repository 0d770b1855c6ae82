//! Domain entities tracked by the processing pipeline.
//!
//! * [`AudioArtifact`]: one uploaded audio file and its lifecycle status.
//! * [`Transcription`]: speech-to-text output, later enriched with an
//!   optimized image prompt.
//! * [`Artwork`]: the generated image for a transcription.
//! * [`ArtStyle`] / [`StyleCatalog`]: the configured style options used at
//!   generation time.
//!
//! # Lifecycle
//!
//! ```text
//! Uploading ──upload done──▶ Processing / Transcribing   (trigger)
//!           ──transcribe──▶ Transcribing
//!           ──optimize────▶ Generating
//!           ──generate────▶ Completed
//! any stage ──failure─────▶ Failed
//! ```

pub mod artwork;
pub mod audio;
pub mod style;
pub mod transcription;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use artwork::Artwork;
pub use audio::{ArtifactId, ArtifactStatus, AudioArtifact};
pub use style::{default_styles, ArtStyle, StyleCatalog};
pub use transcription::Transcription;
