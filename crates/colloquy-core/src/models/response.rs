use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::EntityMap;
use super::intent::IntentType;
use super::session::{ConversationState, Metadata};

/// Response text handed back by a generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    pub confidence: f64,
    pub intent_type: IntentType,
    pub follow_up_questions: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Content hints derived from product and brand preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPersonalization {
    pub categories: BTreeMap<String, f64>,
    pub preferred_brands: Vec<String>,
}

/// Response-shaping hints computed from a user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationModifiers {
    pub response_length: String,
    pub conversation_style: String,
    pub topic_preferences: BTreeMap<String, f64>,
    pub content_personalization: ContentPersonalization,
    pub confidence_boost: f64,
}

impl Default for PersonalizationModifiers {
    fn default() -> Self {
        Self {
            response_length: "medium".to_string(),
            conversation_style: "balanced".to_string(),
            topic_preferences: BTreeMap::new(),
            content_personalization: ContentPersonalization::default(),
            confidence_boost: 0.0,
        }
    }
}

/// Result of one processed turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub session_id: String,
    pub state: ConversationState,
    pub response: Response,
    pub follow_up_questions: Vec<String>,
    pub entities_collected: EntityMap,
    pub personalization_modifiers: PersonalizationModifiers,
    /// True when the guaranteed fallback was returned.
    pub degraded: bool,
}
