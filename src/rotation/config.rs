use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Configuration for the automatic dance-selection heuristics
///
/// All values are loaded from an external JSON file at startup; the engine
/// itself never parses configuration. The defaults below are the calibrated
/// "social dance" preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionProfile {
    pub name: String, // Name for this selection profile
    pub recency: RecencyWeights,
    pub adjacency: AdjacencyWeights,
    pub beginning: BeginningWindow,
    /// Exponent (> 1) applied to the inventory weight; super-linearly
    /// rewards categories with larger libraries
    pub prior_exponent: f64,
}

/// Weights controlling how recent history suppresses candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyWeights {
    pub lookback: u32, // How many history entries back to examine
    pub strength: f64, // Suppression at offset 1; 1.0 forbids immediate repeats outright
    pub decay: f64,    // Geometric falloff per additional offset (0.0 to 1.0)
}

/// Weights controlling back-to-back penalties against the last selections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacencyWeights {
    pub fast_penalty: f64, // Multiplier when a fast dance would follow a fast dance
    pub tag_penalty: f64,  // Multiplier when sharing a tag with the last selection
    pub tag_penalty_prior: f64, // Milder multiplier against the selection before that
    pub similarity_strength: f64, // How much blended similarity discounts a candidate
    pub similarity_blend: SimilarityBlend,
}

/// Blend weights for the similarity score between a candidate and the last
/// selection; must sum to 1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimilarityBlend {
    pub tag_weight: f64,
    pub rating_weight: f64,
    pub level_weight: f64,
}

/// Beginning-of-session suppression of fast dances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeginningWindow {
    pub window: u32,       // Number of selections the window covers
    pub fast_penalty: f64, // Multiplier for fast dances inside the window; 0.0 excludes them
}

impl Default for SelectionProfile {
    fn default() -> Self {
        Self {
            name: "Social".to_string(),
            recency: RecencyWeights {
                lookback: 8,
                strength: 0.97,
                decay: 0.6,
            },
            adjacency: AdjacencyWeights {
                fast_penalty: 0.01,
                tag_penalty: 0.3,
                tag_penalty_prior: 0.65,
                similarity_strength: 0.25,
                similarity_blend: SimilarityBlend {
                    tag_weight: 0.5,
                    rating_weight: 0.25,
                    level_weight: 0.25,
                },
            },
            beginning: BeginningWindow {
                window: 3,
                fast_penalty: 0.0,
            },
            prior_exponent: 1.1,
        }
    }
}

impl SimilarityBlend {
    pub fn sum(&self) -> f64 {
        self.tag_weight + self.rating_weight + self.level_weight
    }
}

impl SelectionProfile {
    /// Load selection profiles directly from a JSON array file
    pub fn load_all_from_file(path: &str) -> Result<Vec<SelectionProfile>> {
        let content = std::fs::read_to_string(path)?;
        let profiles: Vec<SelectionProfile> = serde_json::from_str(&content)?;
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(profiles)
    }

    /// Check the profile for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.recency.lookback == 0 {
            bail!("Profile '{}': recency lookback must be at least 1", self.name);
        }
        if !(0.0..=1.0).contains(&self.recency.strength) {
            bail!(
                "Profile '{}': recency strength must be within 0.0..=1.0",
                self.name
            );
        }
        if !(0.0..=1.0).contains(&self.recency.decay) {
            bail!(
                "Profile '{}': recency decay must be within 0.0..=1.0",
                self.name
            );
        }
        if self.prior_exponent < 1.0 {
            bail!(
                "Profile '{}': prior exponent must be at least 1.0",
                self.name
            );
        }
        let blend_sum = self.adjacency.similarity_blend.sum();
        if (blend_sum - 1.0).abs() > 1e-6 {
            bail!(
                "Profile '{}': similarity blend weights must sum to 1.0 (got {blend_sum})",
                self.name
            );
        }
        for (label, value) in [
            ("fast penalty", self.adjacency.fast_penalty),
            ("tag penalty", self.adjacency.tag_penalty),
            ("prior tag penalty", self.adjacency.tag_penalty_prior),
            ("beginning fast penalty", self.beginning.fast_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("Profile '{}': {label} must be within 0.0..=1.0", self.name);
            }
        }
        Ok(())
    }
}
