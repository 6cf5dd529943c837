//! Named output sizes for batch export.

use serde::{Deserialize, Serialize};

/// Lowest multiplier a preset is ever rendered at.
pub const MIN_PRESET_MULTIPLIER: f64 = 2.0;

/// A named target size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePreset {
    /// Lookup key, e.g. `instagram-post`.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

impl SizePreset {
    /// Create a preset.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width,
            height,
        }
    }

    /// Render multiplier for a document of `doc_width × doc_height`.
    ///
    /// Twice the larger of the two axis ratios, and never below 2, so a
    /// preset smaller than the document still exports crisply.
    #[must_use]
    pub fn multiplier_for(&self, doc_width: u32, doc_height: u32) -> f64 {
        let dw = f64::from(doc_width.max(1));
        let dh = f64::from(doc_height.max(1));
        let ratio = (f64::from(self.width) / dw).max(f64::from(self.height) / dh);
        (ratio * 2.0).max(MIN_PRESET_MULTIPLIER)
    }
}

/// Registry of presets, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRegistry {
    presets: Vec<SizePreset>,
}

impl PresetRegistry {
    /// An empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            presets: Vec::new(),
        }
    }

    /// The built-in social and display-ad sizes.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                SizePreset::new("instagram-post", "Instagram Post", 1080, 1080),
                SizePreset::new("instagram-story", "Instagram Story", 1080, 1920),
                SizePreset::new("facebook-feed", "Facebook Feed", 1200, 628),
                SizePreset::new("twitter-post", "Twitter Post", 1600, 900),
                SizePreset::new("banner", "Banner", 728, 90),
                SizePreset::new("leaderboard", "Leaderboard", 970, 250),
                SizePreset::new("mpu", "MPU", 300, 250),
                SizePreset::new("skyscraper", "Skyscraper", 160, 600),
            ],
        }
    }

    /// Add or replace a preset by key.
    pub fn register(&mut self, preset: SizePreset) {
        if let Some(slot) = self.presets.iter_mut().find(|p| p.key == preset.key) {
            *slot = preset;
        } else {
            self.presets.push(preset);
        }
    }

    /// Look up a preset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SizePreset> {
        self.presets.iter().find(|p| p.key == key)
    }

    /// All presets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SizePreset> {
        self.presets.iter()
    }

    /// Number of presets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
