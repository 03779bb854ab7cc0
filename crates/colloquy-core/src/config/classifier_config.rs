use serde::{Deserialize, Serialize};

use super::defaults;

/// Intent classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Below this confidence callers fall back to the conversational strategy.
    pub confidence_threshold: f64,
    /// Score of any pattern match.
    pub base_confidence: f64,
    /// Added when the pattern is word-boundary anchored.
    pub boundary_bonus: f64,
    /// Optional TOML file replacing or extending the built-in pattern tables.
    pub patterns_path: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            base_confidence: defaults::DEFAULT_BASE_CONFIDENCE,
            boundary_bonus: defaults::DEFAULT_BOUNDARY_BONUS,
            patterns_path: None,
        }
    }
}
