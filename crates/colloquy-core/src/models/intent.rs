use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::EntityMap;

/// The fixed intent enumeration. Declaration order breaks score ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    Greeting,
    Farewell,
    HelpRequest,
    ProductInquiry,
    SportsTopic,
    GeneralQuestion,
    Conversation,
    Unknown,
}

impl IntentType {
    /// Total number of intent types.
    pub const COUNT: usize = 8;

    /// All variants in declaration order.
    pub const ALL: [IntentType; 8] = [
        Self::Greeting,
        Self::Farewell,
        Self::HelpRequest,
        Self::ProductInquiry,
        Self::SportsTopic,
        Self::GeneralQuestion,
        Self::Conversation,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Farewell => "farewell",
            Self::HelpRequest => "help_request",
            Self::ProductInquiry => "product_inquiry",
            Self::SportsTopic => "sports_topic",
            Self::GeneralQuestion => "general_question",
            Self::Conversation => "conversation",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the snake_case name used in pattern files and persisted rows.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Coarse grouping used to key follow-up templates.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Greeting | Self::Farewell | Self::Conversation => "social",
            Self::HelpRequest | Self::GeneralQuestion => "informational",
            Self::ProductInquiry => "product",
            Self::SportsTopic => "sports",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived signals about the utterance's shape and its link to prior turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextFlags {
    pub text_length: usize,
    pub word_count: usize,
    pub has_question_mark: bool,
    pub has_exclamation: bool,
    pub is_follow_up: bool,
    pub previous_intent: Option<IntentType>,
    pub session_length: usize,
}

/// Prior conversational context handed to the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassificationContext {
    pub previous_intent: Option<IntentType>,
    pub session_length: usize,
}

/// A classified utterance. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent_type: IntentType,
    /// Always within [0.0, 1.0].
    pub confidence: f64,
    pub entities: EntityMap,
    pub flags: ContextFlags,
}

impl Intent {
    /// The intent produced for empty or unusable input.
    pub fn unknown() -> Self {
        Self {
            intent_type: IntentType::Unknown,
            confidence: 0.0,
            entities: EntityMap::new(),
            flags: ContextFlags::default(),
        }
    }

    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}
