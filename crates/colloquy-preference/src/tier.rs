//! Personalization tier from preference count and average confidence.

use colloquy_core::config::PreferenceConfig;
use colloquy_core::models::{PersonalizationLevel, UserProfile};

/// The lower of the count tier and the confidence tier. No preferences is `None`.
pub fn personalization_level(
    count: usize,
    average_confidence: f64,
    config: &PreferenceConfig,
) -> PersonalizationLevel {
    if count == 0 {
        return PersonalizationLevel::None;
    }
    let [c1, c2, c3] = config.tier_count_thresholds;
    let by_count = match count {
        n if n >= c3 => PersonalizationLevel::Expert,
        n if n >= c2 => PersonalizationLevel::Advanced,
        n if n >= c1 => PersonalizationLevel::Intermediate,
        _ => PersonalizationLevel::Basic,
    };
    let [f1, f2, f3] = config.tier_confidence_thresholds;
    let by_confidence = match average_confidence {
        c if c >= f3 => PersonalizationLevel::Expert,
        c if c >= f2 => PersonalizationLevel::Advanced,
        c if c >= f1 => PersonalizationLevel::Intermediate,
        _ => PersonalizationLevel::Basic,
    };
    by_count.min(by_confidence)
}

pub fn level_for(profile: &UserProfile, config: &PreferenceConfig) -> PersonalizationLevel {
    personalization_level(
        profile.preference_count(),
        profile.average_confidence(),
        config,
    )
}
