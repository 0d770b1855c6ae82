//! Art style options and the catalog the generation stage picks from.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One recognised art style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtStyle {
    pub id: String,
    /// Display name, also the key matched against requested styles.
    pub name: String,
    pub description: String,
    /// Locator of a preview image for the style.
    pub preview_url: String,
}

impl ArtStyle {
    fn new(id: &str, name: &str, description: &str, preview_url: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            preview_url: preview_url.into(),
        }
    }
}

const PREVIEW_QUERY: &str = "?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=60";

/// The built-in style catalog. The first entry is the default.
pub fn default_styles() -> Vec<ArtStyle> {
    let preview = |photo: &str| format!("https://images.unsplash.com/{photo}{PREVIEW_QUERY}");
    vec![
        ArtStyle::new(
            "1",
            "Abstract",
            "Non-representational art that does not attempt to depict reality",
            &preview("photo-1541701494587-cb58502866ab"),
        ),
        ArtStyle::new(
            "2",
            "Surrealism",
            "Dreamlike scenes with unexpected juxtapositions",
            &preview("photo-1547891654-e66ed7ebb968"),
        ),
        ArtStyle::new(
            "3",
            "Digital Art",
            "Modern digital illustrations with vibrant colors",
            &preview("photo-1558591710-4b4a1ae0f04d"),
        ),
        ArtStyle::new(
            "4",
            "Watercolor",
            "Soft, flowing artwork with transparent color washes",
            &preview("photo-1579783902614-a3fb3927b6a5"),
        ),
        ArtStyle::new(
            "5",
            "Cyberpunk",
            "Futuristic dystopian scenes with neon lights and technology",
            &preview("photo-1515630278258-407f66498911"),
        ),
    ]
}

// ---------------------------------------------------------------------------
// StyleCatalog
// ---------------------------------------------------------------------------

/// Non-empty set of style options.
///
/// Requested style keys are matched against [`ArtStyle::name`] (case
/// insensitive) or [`ArtStyle::id`]; anything unrecognised resolves to the
/// first catalog entry.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    styles: Vec<ArtStyle>,
}

impl StyleCatalog {
    /// Build a catalog; an empty list falls back to [`default_styles`].
    pub fn new(styles: Vec<ArtStyle>) -> Self {
        if styles.is_empty() {
            log::warn!("style catalog is empty, using built-in styles");
            return Self::default();
        }
        Self { styles }
    }

    pub fn styles(&self) -> &[ArtStyle] {
        &self.styles
    }

    /// The fallback entry used for absent or unknown styles.
    pub fn default_style(&self) -> &ArtStyle {
        &self.styles[0]
    }

    /// Look up a style by name or id.
    pub fn find(&self, key: &str) -> Option<&ArtStyle> {
        let key = key.trim();
        self.styles
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(key) || s.id == key)
    }

    /// Resolve a requested style, falling back to the default entry.
    ///
    /// ```
    /// use audio_to_art::artifact::StyleCatalog;
    ///
    /// let catalog = StyleCatalog::default();
    /// assert_eq!(catalog.resolve(Some("watercolor")).name, "Watercolor");
    /// assert_eq!(catalog.resolve(Some("Baroque")).name, "Abstract");
    /// assert_eq!(catalog.resolve(None).name, "Abstract");
    /// ```
    pub fn resolve(&self, key: Option<&str>) -> &ArtStyle {
        match key.and_then(|k| self.find(k)) {
            Some(style) => style,
            None => {
                if let Some(k) = key {
                    log::debug!("unknown style {k:?}, using {}", self.default_style().name);
                }
                self.default_style()
            }
        }
    }

    /// Uniform random pick over the whole catalog.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> &ArtStyle {
        self.styles.choose(rng).unwrap_or_else(|| self.default_style())
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self {
            styles: default_styles(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
