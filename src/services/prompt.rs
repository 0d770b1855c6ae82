//! Prompt construction for the optimization and generation stages.
//!
//! [`PromptBuilder`] turns a raw transcription into a `(system_msg,
//! user_msg)` pair for any OpenAI-compatible `/v1/chat/completions`
//! endpoint, asking for an image-generation prompt.
//!
//! [`PROMPT_TEMPLATES`] are the fixed rewrites used by the offline demo
//! optimizer, and [`styled_prompt`] folds an [`ArtStyle`] into the prompt
//! sent to the image service.

use crate::artifact::ArtStyle;

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

const SYSTEM_INSTRUCTION: &str = "\
You turn spoken-word transcriptions into prompts for an image-generation model.
Task: Write one vivid visual prompt that captures the imagery and mood of the transcription.

Rules:
1. Keep every concrete subject, place and object mentioned in the transcription.
2. Add visual detail: lighting, colour palette, composition, atmosphere.
3. Do not mention an art style; the style is applied separately.
4. Never add text, captions or watermarks to the scene.
5. Reply with ONLY the prompt, one paragraph, no explanation.";

// ---------------------------------------------------------------------------
// Few-shot examples
// ---------------------------------------------------------------------------

const FEW_SHOT_EXAMPLES: &str = "
Examples:
Input: \"Waves crashed against the shore, a rhythmic lullaby.\"
Output: \"Towering waves breaking on a moonlit shore, silver spray frozen mid-air, deep blue and pearl tones, calm and timeless.\"

Input: \"The city lights sparkled like fireflies.\"
Output: \"A night skyline seen from a hilltop, thousands of warm window lights glowing like fireflies against an indigo sky.\"
";

// ---------------------------------------------------------------------------
// Demo templates
// ---------------------------------------------------------------------------

/// Rewrites applied by the demo optimizer; `{text}` is replaced with the
/// transcription.
pub const PROMPT_TEMPLATES: [&str; 5] = [
    "Create a vibrant, dreamlike visualization of: {text}",
    "Imagine a surreal landscape where: {text}",
    "Design an abstract representation inspired by: {text}",
    "Visualize an emotional journey through: {text}",
    "Transform into a cosmic scene where: {text}",
];

/// Substitute `text` into `template`.
///
/// ```
/// use audio_to_art::services::prompt::apply_template;
///
/// assert_eq!(
///     apply_template("Imagine a surreal landscape where: {text}", "stars fell"),
///     "Imagine a surreal landscape where: stars fell"
/// );
/// ```
pub fn apply_template(template: &str, text: &str) -> String {
    template.replace("{text}", text)
}

/// Prompt sent to the image service: the optimized prompt plus the style.
pub fn styled_prompt(prompt: &str, style: &ArtStyle) -> String {
    format!(
        "{}\n\nArt style: {} ({}).",
        prompt.trim(),
        style.name,
        style.description
    )
}

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds prompt-optimization requests as chat messages.
///
/// # Example
/// ```rust
/// use audio_to_art::services::PromptBuilder;
///
/// let (system, user) = PromptBuilder::new().build_chat("the forest was alive");
/// assert!(system.contains("image-generation"));
/// assert!(user.contains("the forest was alive"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a **(system_msg, user_msg)** pair (for OpenAI-compatible APIs).
    pub fn build_chat(&self, transcription: &str) -> (String, String) {
        let mut user_msg = String::with_capacity(1024);
        user_msg.push_str(FEW_SHOT_EXAMPLES);
        user_msg.push_str(&Self::input_block(transcription));

        (SYSTEM_INSTRUCTION.to_string(), user_msg)
    }

    fn input_block(transcription: &str) -> String {
        format!("\nTranscription:\n{}\n\nPrompt:\n", transcription.trim())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::StyleCatalog;

    #[test]
    fn system_instruction_forbids_style_and_text() {
        let (system, _) = PromptBuilder::new().build_chat("anything");
        assert!(system.contains("Do not mention an art style"));
        assert!(system.contains("watermarks"));
    }

    #[test]
    fn user_msg_has_examples_transcription_and_cue() {
        let (_, user) = PromptBuilder::new().build_chat("  stars twinkled  ");
        assert!(user.contains("Examples:"));
        assert!(user.contains("Transcription:\nstars twinkled\n"));
        assert!(user.ends_with("Prompt:\n"));
    }

    #[test]
    fn every_template_embeds_text() {
        for template in PROMPT_TEMPLATES {
            let out = apply_template(template, "waves crashed");
            assert!(out.ends_with("waves crashed"), "{out}");
            assert!(!out.contains("{text}"));
        }
    }

    #[test]
    fn styled_prompt_names_style() {
        let catalog = StyleCatalog::default();
        let style = catalog.resolve(Some("Watercolor"));
        let out = styled_prompt("A calm lake ", style);
        assert!(out.starts_with("A calm lake\n"));
        assert!(out.contains("Art style: Watercolor (Soft, flowing"));
    }
}
