//! audio-to-art: turns uploaded audio into generated artwork.
//!
//! Each upload is transcribed, the transcription is rewritten into an image
//! prompt, and an image is generated for that prompt in a chosen art style.

pub mod artifact;
pub mod config;
pub mod pipeline;
pub mod services;
pub mod upload;
