//! Weighted-average merge of observations into a profile.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use colloquy_core::models::{
    Metadata, PreferenceObservation, PreferenceTable, PreferenceValue, UserPreference,
};

/// Merge one observation. A new `(type, key)` is inserted as observed; an
/// existing one takes the weight-averaged value and confidence, and its
/// weight grows to `old + new` capped at `weight_cap`.
pub fn merge_observation(
    table: &mut PreferenceTable,
    user_id: &str,
    obs: &PreferenceObservation,
    now: DateTime<Utc>,
    weight_cap: f64,
) -> UserPreference {
    let by_key = table.entry(obs.preference_type).or_default();
    match by_key.get_mut(&obs.key) {
        Some(existing) => {
            let total = existing.weight + obs.weight;
            if total > 0.0 {
                existing.value =
                    merge_values(&existing.value, existing.weight, &obs.value, obs.weight);
                existing.confidence =
                    (existing.confidence * existing.weight + obs.confidence * obs.weight) / total;
            }
            existing.weight = total.min(weight_cap);
            existing.updated_at = now;
            existing.access_count += 1;
            existing.clone()
        }
        None => {
            let inserted = UserPreference {
                user_id: user_id.to_string(),
                preference_type: obs.preference_type,
                key: obs.key.clone(),
                value: obs.value.clone(),
                confidence: obs.confidence.clamp(0.0, 1.0),
                weight: obs.weight.min(weight_cap),
                created_at: now,
                updated_at: now,
                access_count: 0,
                metadata: Metadata::new(),
                last_decayed_at: None,
            };
            by_key.insert(obs.key.clone(), inserted.clone());
            inserted
        }
    }
}

/// Numbers and per-key scores average by weight. Text, and any change of
/// value kind, takes the newer observation.
pub fn merge_values(
    old: &PreferenceValue,
    old_weight: f64,
    new: &PreferenceValue,
    new_weight: f64,
) -> PreferenceValue {
    let total = old_weight + new_weight;
    let avg = |a: f64, b: f64| (a * old_weight + b * new_weight) / total;
    match (old, new) {
        (PreferenceValue::Number(a), PreferenceValue::Number(b)) => {
            PreferenceValue::Number(avg(*a, *b))
        }
        (PreferenceValue::Scores(a), PreferenceValue::Scores(b)) => {
            let mut merged: BTreeMap<String, f64> = a.clone();
            for (key, score) in b {
                let value = match a.get(key) {
                    Some(prev) => avg(*prev, *score),
                    None => *score,
                };
                merged.insert(key.clone(), value);
            }
            PreferenceValue::Scores(merged)
        }
        _ => new.clone(),
    }
}
