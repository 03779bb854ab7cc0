use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::{MemoryType, RetentionPolicy};

/// Memory & context store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Snapshot every N user turns (and on every state change).
    pub snapshot_interval: usize,
    pub intent_history_len: usize,
    /// Turns considered when picking the dominant intent for a summary.
    pub summary_window: usize,
    pub relevance_threshold: f64,
    pub relevant_context_limit: usize,
    /// Most recent snapshots scored for relevance.
    pub relevance_candidates: usize,
    pub inactive_context_hours: u64,
    /// Per-type policy overrides. Key is the memory type name.
    pub retention_overrides: HashMap<String, RetentionPolicy>,
}

impl MemoryConfig {
    /// Effective policy for a tier: override if configured, else compiled default.
    pub fn policy_for(&self, memory_type: MemoryType) -> RetentionPolicy {
        self.retention_overrides
            .get(memory_type.as_str())
            .copied()
            .unwrap_or_else(|| RetentionPolicy::default_for(memory_type))
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: defaults::DEFAULT_SNAPSHOT_INTERVAL,
            intent_history_len: defaults::DEFAULT_INTENT_HISTORY_LEN,
            summary_window: defaults::DEFAULT_SUMMARY_WINDOW,
            relevance_threshold: defaults::DEFAULT_RELEVANCE_THRESHOLD,
            relevant_context_limit: defaults::DEFAULT_RELEVANT_CONTEXT_LIMIT,
            relevance_candidates: defaults::DEFAULT_RELEVANCE_CANDIDATES,
            inactive_context_hours: defaults::DEFAULT_INACTIVE_CONTEXT_HOURS,
            retention_overrides: HashMap::new(),
        }
    }
}
