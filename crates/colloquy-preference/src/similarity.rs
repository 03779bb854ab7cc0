//! Cross-user profile similarity.

use colloquy_core::models::{PreferenceType, PreferenceValue, UserProfile};

/// Mean over preference types both profiles hold with at least one shared
/// key. Within a type: mean of `value similarity × mean confidence`.
pub fn profile_similarity(a: &UserProfile, b: &UserProfile) -> f64 {
    let mut total = 0.0;
    let mut compared = 0usize;

    for preference_type in PreferenceType::ALL {
        let (Some(left), Some(right)) = (
            a.preferences.get(&preference_type),
            b.preferences.get(&preference_type),
        ) else {
            continue;
        };
        let mut type_total = 0.0;
        let mut shared = 0usize;
        for (key, pa) in left {
            let Some(pb) = right.get(key) else {
                continue;
            };
            let confidence = (pa.confidence + pb.confidence) / 2.0;
            type_total += value_similarity(&pa.value, &pb.value) * confidence;
            shared += 1;
        }
        if shared > 0 {
            total += type_total / shared as f64;
            compared += 1;
        }
    }

    if compared == 0 {
        0.0
    } else {
        total / compared as f64
    }
}

/// 1.0 for identical values, 0.0 for unrelated kinds.
pub fn value_similarity(a: &PreferenceValue, b: &PreferenceValue) -> f64 {
    match (a, b) {
        (PreferenceValue::Number(x), PreferenceValue::Number(y)) => {
            (1.0 - (x - y).abs()).clamp(0.0, 1.0)
        }
        (PreferenceValue::Text(x), PreferenceValue::Text(y)) => {
            if x == y {
                1.0
            } else {
                0.0
            }
        }
        (PreferenceValue::Scores(x), PreferenceValue::Scores(y)) => {
            let diffs: Vec<f64> = x
                .iter()
                .filter_map(|(k, vx)| y.get(k).map(|vy| (vx - vy).abs()))
                .collect();
            if diffs.is_empty() {
                0.0
            } else {
                (1.0 - diffs.iter().sum::<f64>() / diffs.len() as f64).clamp(0.0, 1.0)
            }
        }
        _ => 0.0,
    }
}
