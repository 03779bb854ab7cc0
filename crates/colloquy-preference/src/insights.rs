//! Read-only summaries of a user's profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use colloquy_core::models::{InteractionPatterns, PersonalizationLevel, PreferenceType, UserProfile};

const TOP_PER_TYPE: usize = 3;
const TOP_TOPICS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPreference {
    pub key: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub count: usize,
    pub average_confidence: f64,
    pub top_preferences: Vec<RankedPreference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralPatterns {
    /// `high`, `normal` or `low`.
    pub interaction_frequency: String,
    pub exploration_tendency: f64,
    pub loyalty_score: f64,
}

/// Profile summary returned by `get_user_insights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInsights {
    pub user_id: String,
    pub personalization_level: PersonalizationLevel,
    pub total_preferences: usize,
    pub total_interactions: u64,
    pub session_count: u64,
    pub preference_summary: BTreeMap<PreferenceType, TypeSummary>,
    pub top_topics: Vec<RankedPreference>,
    pub behavioral_patterns: BehavioralPatterns,
    pub interaction_patterns: InteractionPatterns,
}

impl UserInsights {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let preference_summary = profile
            .preferences
            .iter()
            .filter(|(_, by_key)| !by_key.is_empty())
            .map(|(preference_type, by_key)| {
                let ranked = ranked(by_key.iter().map(|(k, p)| (k.as_str(), p.confidence)));
                let count = ranked.len();
                let average_confidence =
                    ranked.iter().map(|r| r.confidence).sum::<f64>() / count as f64;
                let summary = TypeSummary {
                    count,
                    average_confidence,
                    top_preferences: ranked.into_iter().take(TOP_PER_TYPE).collect(),
                };
                (*preference_type, summary)
            })
            .collect();

        let top_topics = profile
            .preferences
            .get(&PreferenceType::Topic)
            .map(|topics| {
                let mut ranked = ranked(topics.iter().map(|(k, p)| (k.as_str(), p.confidence)));
                ranked.truncate(TOP_TOPICS);
                ranked
            })
            .unwrap_or_default();

        Self {
            user_id: profile.user_id.clone(),
            personalization_level: profile.personalization_level,
            total_preferences: profile.preference_count(),
            total_interactions: profile.total_interactions,
            session_count: profile.session_count,
            preference_summary,
            top_topics,
            behavioral_patterns: behavioral_patterns(profile),
            interaction_patterns: profile.interaction_patterns.clone(),
        }
    }
}

/// Descending confidence, ties by key.
fn ranked<'a>(entries: impl Iterator<Item = (&'a str, f64)>) -> Vec<RankedPreference> {
    let mut out: Vec<RankedPreference> = entries
        .map(|(key, confidence)| RankedPreference {
            key: key.to_string(),
            confidence,
        })
        .collect();
    out.sort_by(|a, b| b.confidence.total_cmp(&a.confidence).then_with(|| a.key.cmp(&b.key)));
    out
}

pub fn behavioral_patterns(profile: &UserProfile) -> BehavioralPatterns {
    let interaction_frequency = match profile.total_interactions {
        n if n > 50 => "high",
        n if n < 10 => "low",
        _ => "normal",
    };
    let topic_count = profile
        .preferences
        .get(&PreferenceType::Topic)
        .map_or(0, |t| t.len());
    let exploration_tendency = match topic_count {
        n if n > 5 => 0.8,
        n if n < 2 => 0.2,
        _ => 0.5,
    };
    let loyalty_score = if profile.preference_count() == 0 {
        0.5
    } else {
        profile.average_confidence()
    };
    BehavioralPatterns {
        interaction_frequency: interaction_frequency.to_string(),
        exploration_tendency,
        loyalty_score,
    }
}
