//! Response-shaping hints derived from a profile. Read-only.

use colloquy_core::models::{
    ContentPersonalization, PersonalizationModifiers, PreferenceType, UserProfile,
};

use crate::extractors::{COMMUNICATION_STYLE, PREFERRED_LENGTH, STYLES};

pub fn modifiers_for(profile: &UserProfile) -> PersonalizationModifiers {
    let mut modifiers = PersonalizationModifiers::default();

    if let Some(scores) = profile
        .get(PreferenceType::ConversationStyle, COMMUNICATION_STYLE)
        .and_then(|p| p.value.as_scores())
    {
        if let Some(style) = dominant_style(scores.iter().map(|(k, v)| (k.as_str(), *v))) {
            modifiers.conversation_style = style.to_string();
        }
    }

    if let Some(length) = profile
        .get(PreferenceType::ResponseLength, PREFERRED_LENGTH)
        .and_then(|p| p.value.as_text())
    {
        modifiers.response_length = length.to_string();
    }

    if let Some(topics) = profile.preferences.get(&PreferenceType::Topic) {
        for (topic, pref) in topics {
            if let Some(value) = pref.value.as_number() {
                modifiers.topic_preferences.insert(topic.clone(), value);
            }
        }
    }

    let mut content = ContentPersonalization::default();
    if let Some(categories) = profile.preferences.get(&PreferenceType::ProductCategory) {
        for (category, pref) in categories {
            if let Some(value) = pref.value.as_number() {
                content.categories.insert(category.clone(), value);
            }
        }
    }
    if let Some(brands) = profile.preferences.get(&PreferenceType::Brand) {
        content.preferred_brands = brands.keys().cloned().collect();
    }
    modifiers.content_personalization = content;
    modifiers.confidence_boost = profile.personalization_level.confidence_boost();

    modifiers
}

/// Highest-scoring known style; ties follow [`STYLES`] order.
pub fn dominant_style<'a>(scores: impl Iterator<Item = (&'a str, f64)>) -> Option<&'static str> {
    let known: Vec<(&'static str, f64)> = scores
        .filter_map(|(name, score)| STYLES.iter().find(|s| **s == name).map(|s| (*s, score)))
        .collect();
    let max = known.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }
    STYLES
        .iter()
        .copied()
        .find(|style| known.iter().any(|(name, score)| name == style && *score == max))
}
