use serde::{Deserialize, Serialize};

use super::defaults;

/// Background sweep schedules, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub memory_interval_secs: u64,
    pub session_interval_secs: u64,
    pub decay_interval_secs: u64,
    pub context_interval_secs: u64,
}

impl SweepConfig {
    pub(crate) fn intervals(&self) -> [(&'static str, u64); 4] {
        [
            ("sweep.memory_interval_secs", self.memory_interval_secs),
            ("sweep.session_interval_secs", self.session_interval_secs),
            ("sweep.decay_interval_secs", self.decay_interval_secs),
            ("sweep.context_interval_secs", self.context_interval_secs),
        ]
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            memory_interval_secs: defaults::DEFAULT_MEMORY_SWEEP_SECS,
            session_interval_secs: defaults::DEFAULT_SESSION_SWEEP_SECS,
            decay_interval_secs: defaults::DEFAULT_DECAY_SWEEP_SECS,
            context_interval_secs: defaults::DEFAULT_CONTEXT_SWEEP_SECS,
        }
    }
}
