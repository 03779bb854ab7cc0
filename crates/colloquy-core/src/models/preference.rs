use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::Metadata;

/// Kinds of learned preference signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceType {
    Topic,
    ProductCategory,
    Brand,
    PriceRange,
    ConversationStyle,
    ResponseLength,
    SportsTeam,
    ContentType,
    InteractionPattern,
}

impl PreferenceType {
    pub const ALL: [PreferenceType; 9] = [
        Self::Topic,
        Self::ProductCategory,
        Self::Brand,
        Self::PriceRange,
        Self::ConversationStyle,
        Self::ResponseLength,
        Self::SportsTeam,
        Self::ContentType,
        Self::InteractionPattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::ProductCategory => "product_category",
            Self::Brand => "brand",
            Self::PriceRange => "price_range",
            Self::ConversationStyle => "conversation_style",
            Self::ResponseLength => "response_length",
            Self::SportsTeam => "sports_team",
            Self::ContentType => "content_type",
            Self::InteractionPattern => "interaction_pattern",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for PreferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A preference payload: a scalar affinity, a label, or a score table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Number(f64),
    Text(String),
    Scores(BTreeMap<String, f64>),
}

impl PreferenceValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scores(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Self::Scores(s) => Some(s),
            _ => None,
        }
    }
}

/// One learned `(type, key)` signal in a user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    pub user_id: String,
    pub preference_type: PreferenceType,
    pub key: String,
    pub value: PreferenceValue,
    pub confidence: f64,
    /// Capped accumulator; see `preference.weight_cap`.
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub access_count: u64,
    #[serde(default)]
    pub metadata: Metadata,
    /// Last instant decay was applied, so sweeps never decay an interval twice.
    #[serde(default)]
    pub last_decayed_at: Option<DateTime<Utc>>,
}

/// A single extractor output, not yet merged into a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceObservation {
    pub preference_type: PreferenceType,
    pub key: String,
    pub value: PreferenceValue,
    pub confidence: f64,
    pub weight: f64,
}

/// Coarse label for how much reliable preference data exists for a user.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PersonalizationLevel {
    #[default]
    None,
    Basic,
    Intermediate,
    Advanced,
    Expert,
}

impl PersonalizationLevel {
    pub const ALL: [PersonalizationLevel; 5] = [
        Self::None,
        Self::Basic,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }

    /// Fixed response-confidence boost per tier.
    pub fn confidence_boost(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Basic => 0.05,
            Self::Intermediate => 0.1,
            Self::Advanced => 0.15,
            Self::Expert => 0.2,
        }
    }
}

/// Raw message-shape counters accumulated across a user's turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionPatterns {
    pub questions_asked: u64,
    pub exclamations: u64,
    pub total_words: u64,
}

pub type PreferenceTable = BTreeMap<PreferenceType, BTreeMap<String, UserPreference>>;

/// One per user, created lazily, never auto-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub personalization_level: PersonalizationLevel,
    pub preferences: PreferenceTable,
    pub interaction_patterns: InteractionPatterns,
    pub total_interactions: u64,
    pub session_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            personalization_level: PersonalizationLevel::None,
            preferences: PreferenceTable::new(),
            interaction_patterns: InteractionPatterns::default(),
            total_interactions: 0,
            session_count: 0,
            created_at: now,
            last_updated_at: now,
        }
    }

    pub fn get(&self, preference_type: PreferenceType, key: &str) -> Option<&UserPreference> {
        self.preferences.get(&preference_type)?.get(key)
    }

    pub fn preference_count(&self) -> usize {
        self.preferences.values().map(|m| m.len()).sum()
    }

    /// Mean confidence over every stored preference, 0.0 when empty.
    pub fn average_confidence(&self) -> f64 {
        let count = self.preference_count();
        if count == 0 {
            return 0.0;
        }
        let total: f64 = self
            .preferences
            .values()
            .flat_map(|m| m.values())
            .map(|p| p.confidence)
            .sum();
        total / count as f64
    }

    pub fn iter_preferences(&self) -> impl Iterator<Item = &UserPreference> {
        self.preferences.values().flat_map(|m| m.values())
    }
}
