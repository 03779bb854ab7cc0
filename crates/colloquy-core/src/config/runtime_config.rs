use serde::{Deserialize, Serialize};

use super::defaults;

/// Turn pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bound on the whole classify → transition → update pipeline.
    pub turn_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            turn_timeout_ms: defaults::DEFAULT_TURN_TIMEOUT_MS,
        }
    }
}
