//! Per-turn preference signal extractors.

use std::collections::BTreeMap;

use colloquy_core::models::{
    EntityType, Intent, IntentType, PreferenceObservation, PreferenceType, PreferenceValue,
};

/// Key of the structured conversation-style preference.
pub const COMMUNICATION_STYLE: &str = "communication_style";
/// Key of the response-length preference.
pub const PREFERRED_LENGTH: &str = "preferred_length";

/// Style names scored per turn. Order breaks ties when picking a dominant style.
pub const STYLES: [&str; 6] = [
    "detailed",
    "casual",
    "formal",
    "inquisitive",
    "concise",
    "enthusiastic",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// Intent affinity plus entity-derived interests.
    Topic,
    /// Conversation style and preferred response length from message shape.
    InteractionStyle,
}

impl Extractor {
    pub const ALL: [Extractor; 2] = [Self::Topic, Self::InteractionStyle];

    pub fn extract(&self, text: &str, intent: &Intent) -> Vec<PreferenceObservation> {
        match self {
            Self::Topic => topic_observations(intent),
            Self::InteractionStyle => style_observations(text),
        }
    }
}

/// Run every extractor in order.
pub fn extract_all(text: &str, intent: &Intent) -> Vec<PreferenceObservation> {
    Extractor::ALL
        .iter()
        .flat_map(|e| e.extract(text, intent))
        .collect()
}

fn topic_observations(intent: &Intent) -> Vec<PreferenceObservation> {
    let mut out = Vec::new();
    if intent.intent_type != IntentType::Unknown {
        out.push(PreferenceObservation {
            preference_type: PreferenceType::Topic,
            key: intent.intent_type.as_str().to_string(),
            value: PreferenceValue::Number(topic_affinity(intent)),
            confidence: 0.7,
            weight: 0.8,
        });
    }
    for (entity, values) in &intent.entities {
        let (preference_type, value) = entity_preference(*entity);
        for v in values {
            out.push(PreferenceObservation {
                preference_type,
                key: v.clone(),
                value: PreferenceValue::Number(value),
                confidence: 0.6,
                weight: 0.7,
            });
        }
    }
    out
}

/// `0.5 + min(0.1 per entity type, 0.3) + intent boost`, capped at 1.0.
pub fn topic_affinity(intent: &Intent) -> f64 {
    let entity_boost = (intent.entities.len() as f64 * 0.1).min(0.3);
    let intent_boost = match intent.intent_type {
        IntentType::SportsTopic => 0.3,
        IntentType::ProductInquiry => 0.2,
        IntentType::HelpRequest => 0.1,
        _ => 0.0,
    };
    (0.5 + entity_boost + intent_boost).min(1.0)
}

fn entity_preference(entity: EntityType) -> (PreferenceType, f64) {
    match entity {
        EntityType::ProductType => (PreferenceType::ProductCategory, 0.6),
        EntityType::Sport => (PreferenceType::Topic, 0.7),
        EntityType::Brand => (PreferenceType::Brand, 0.5),
        EntityType::Team => (PreferenceType::SportsTeam, 0.8),
        EntityType::PriceRange => (PreferenceType::PriceRange, 0.5),
    }
}

fn style_observations(text: &str) -> Vec<PreferenceObservation> {
    let word_count = text.split_whitespace().count();
    vec![
        PreferenceObservation {
            preference_type: PreferenceType::ConversationStyle,
            key: COMMUNICATION_STYLE.to_string(),
            value: PreferenceValue::Scores(style_scores(
                word_count,
                text.contains('?'),
                text.contains('!'),
            )),
            confidence: 0.5,
            weight: 0.6,
        },
        PreferenceObservation {
            preference_type: PreferenceType::ResponseLength,
            key: PREFERRED_LENGTH.to_string(),
            value: PreferenceValue::Text(preferred_length(word_count).to_string()),
            confidence: 0.4,
            weight: 0.5,
        },
    ]
}

pub fn style_scores(word_count: usize, question: bool, exclamation: bool) -> BTreeMap<String, f64> {
    let mut formal = 0.5;
    let mut casual = 0.5;
    let mut detailed = 0.5;
    let mut concise = 0.5;
    let mut inquisitive = 0.0;
    let mut enthusiastic = 0.0;

    if word_count > 15 {
        detailed += 0.3;
        concise -= 0.3;
    } else if word_count < 5 {
        concise += 0.3;
        detailed -= 0.3;
    }
    if question {
        inquisitive += 0.4;
    }
    if exclamation {
        enthusiastic += 0.4;
        casual += 0.2;
        formal -= 0.2;
    }

    [
        ("formal", formal),
        ("casual", casual),
        ("detailed", detailed),
        ("concise", concise),
        ("inquisitive", inquisitive),
        ("enthusiastic", enthusiastic),
    ]
    .into_iter()
    .map(|(k, v): (&str, f64)| (k.to_string(), v.clamp(0.0, 1.0)))
    .collect()
}

pub fn preferred_length(word_count: usize) -> &'static str {
    match word_count {
        0..=5 => "short",
        6..=12 => "medium",
        _ => "detailed",
    }
}
