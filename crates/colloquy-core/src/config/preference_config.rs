use serde::{Deserialize, Serialize};

use super::defaults;

/// Preference engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    /// Daily multiplicative decay applied to weight and confidence.
    pub decay_rate: f64,
    /// Preferences decayed below this confidence are pruned.
    pub min_confidence: f64,
    pub weight_cap: f64,
    /// Minimum profile similarity reported by similar-user lookup.
    pub similarity_threshold: f64,
    /// Distinct-preference counts at which Intermediate, Advanced and Expert start.
    pub tier_count_thresholds: [usize; 3],
    /// Average confidences at which Intermediate, Advanced and Expert start.
    pub tier_confidence_thresholds: [f64; 3],
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            decay_rate: defaults::DEFAULT_DECAY_RATE,
            min_confidence: defaults::DEFAULT_MIN_CONFIDENCE,
            weight_cap: defaults::DEFAULT_WEIGHT_CAP,
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            tier_count_thresholds: defaults::DEFAULT_TIER_COUNT_THRESHOLDS,
            tier_confidence_thresholds: defaults::DEFAULT_TIER_CONFIDENCE_THRESHOLDS,
        }
    }
}
