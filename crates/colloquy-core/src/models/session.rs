use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{merge_entities, EntityMap};
use super::intent::{Intent, IntentType};

/// Free-form JSON metadata attached to turns, sessions and memories.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Dialogue automaton states. `Initial` is the only start state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Initial,
    Greeting,
    InformationGathering,
    Discussion,
    QuestionAnswering,
    FollowUp,
    Conclusion,
}

impl ConversationState {
    pub const ALL: [ConversationState; 7] = [
        Self::Initial,
        Self::Greeting,
        Self::InformationGathering,
        Self::Discussion,
        Self::QuestionAnswering,
        Self::FollowUp,
        Self::Conclusion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Greeting => "greeting",
            Self::InformationGathering => "information_gathering",
            Self::Discussion => "discussion",
            Self::QuestionAnswering => "question_answering",
            Self::FollowUp => "follow_up",
            Self::Conclusion => "conclusion",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// One entry of a session's append-only turn log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub id: String,
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub intent: Option<Intent>,
    pub response: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl DialogueTurn {
    pub fn user(content: &str, intent: Intent, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            speaker: Speaker::User,
            content: content.to_string(),
            timestamp: at,
            intent: Some(intent),
            response: None,
            metadata: Metadata::new(),
        }
    }

    pub fn assistant(content: &str, at: DateTime<Utc>, metadata: Metadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            speaker: Speaker::Assistant,
            content: content.to_string(),
            timestamp: at,
            intent: None,
            response: Some(content.to_string()),
            metadata,
        }
    }
}

/// Rolling per-session context refreshed on every turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionContext {
    pub last_intent: Option<IntentType>,
    pub last_intent_confidence: f64,
    /// User messages processed so far.
    pub message_count: usize,
    pub is_follow_up: bool,
    pub has_question_mark: bool,
    /// Consecutive turns spent in the current state.
    pub conversation_depth: usize,
    pub last_response_strategy: Option<String>,
}

/// A bounded, stateful conversation between one user and the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub user_id: String,
    pub state: ConversationState,
    pub turn_log: Vec<DialogueTurn>,
    pub entities_collected: EntityMap,
    pub follow_up_queue: Vec<String>,
    pub context: SessionContext,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ConversationSession {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            state: ConversationState::Initial,
            turn_log: Vec::new(),
            entities_collected: EntityMap::new(),
            follow_up_queue: Vec::new(),
            context: SessionContext::default(),
            created_at: now,
            last_activity_at: now,
            metadata: Metadata::new(),
        }
    }

    /// Expired once idle strictly longer than `timeout`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity_at > timeout
    }

    /// Merge newly extracted entities without introducing duplicates.
    pub fn merge_entities(&mut self, entities: &EntityMap) -> usize {
        merge_entities(&mut self.entities_collected, entities)
    }

    /// The last `n` turns in log order.
    pub fn recent_turns(&self, n: usize) -> &[DialogueTurn] {
        let start = self.turn_log.len().saturating_sub(n);
        &self.turn_log[start..]
    }

    /// Intent types of the user turns, oldest first.
    pub fn intent_history(&self) -> Vec<IntentType> {
        self.turn_log
            .iter()
            .filter_map(|t| t.intent.as_ref().map(|i| i.intent_type))
            .collect()
    }
}
