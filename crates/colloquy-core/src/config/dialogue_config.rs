use serde::{Deserialize, Serialize};

use super::defaults;

/// Conversation state machine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Idle time after which a session is treated as gone.
    pub session_timeout_secs: u64,
    /// Logged turns beyond which non-concluding transitions collapse to discussion.
    pub gathering_turn_limit: usize,
    pub max_follow_ups: usize,
    /// Recent turns handed to domain advisors.
    pub advisor_history: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: defaults::DEFAULT_SESSION_TIMEOUT_SECS,
            gathering_turn_limit: defaults::DEFAULT_GATHERING_TURN_LIMIT,
            max_follow_ups: defaults::DEFAULT_MAX_FOLLOW_UPS,
            advisor_history: defaults::DEFAULT_ADVISOR_HISTORY,
        }
    }
}
