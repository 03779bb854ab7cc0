//! Historic relevance between two opaque context payloads.

use std::collections::HashSet;

use serde_json::Value;

const KEY_WEIGHT: f64 = 0.6;
const VALUE_WEIGHT: f64 = 0.4;

/// `0.6 × key Jaccard + 0.4 × mean character Jaccard over shared keys`.
/// Non-object payloads have no keys and score 0.0.
pub fn context_relevance(current: &Value, historical: &Value) -> f64 {
    let (Some(current), Some(historical)) = (current.as_object(), historical.as_object()) else {
        return 0.0;
    };
    let current_keys: HashSet<&String> = current.keys().collect();
    let historical_keys: HashSet<&String> = historical.keys().collect();
    let union = current_keys.union(&historical_keys).count();
    if union == 0 {
        return 0.0;
    }
    let shared: Vec<&String> = current_keys.intersection(&historical_keys).copied().collect();
    let key_overlap = shared.len() as f64 / union as f64;

    let scores: Vec<f64> = shared
        .iter()
        .filter_map(|key| char_jaccard(&stringify(&current[*key]), &stringify(&historical[*key])))
        .collect();
    let value_similarity = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    KEY_WEIGHT * key_overlap + VALUE_WEIGHT * value_similarity
}

/// Jaccard over lowercased character sets. None when both strings are empty.
pub fn char_jaccard(a: &str, b: &str) -> Option<f64> {
    let left: HashSet<char> = a.to_lowercase().chars().collect();
    let right: HashSet<char> = b.to_lowercase().chars().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return None;
    }
    Some(left.intersection(&right).count() as f64 / union as f64)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_contexts_score_one() {
        let ctx = json!({"topic": "laptops", "budget": 900});
        assert!((context_relevance(&ctx, &ctx) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_keys_score_zero() {
        let a = json!({"topic": "laptops"});
        let b = json!({"team": "arsenal"});
        assert_eq!(context_relevance(&a, &b), 0.0);
    }

    #[test]
    fn partial_overlap_combines_both_terms() {
        // keys: {topic} shared of {topic, budget} -> 0.5
        // values: "ab" vs "abcd" -> 2/4 = 0.5
        let a = json!({"topic": "ab", "budget": 1});
        let b = json!({"topic": "abcd"});
        let expected = 0.6 * 0.5 + 0.4 * 0.5;
        assert!((context_relevance(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn non_objects_score_zero() {
        assert_eq!(context_relevance(&json!("x"), &json!({"a": 1})), 0.0);
    }

    #[test]
    fn char_jaccard_is_case_insensitive() {
        assert_eq!(char_jaccard("ABC", "abc"), Some(1.0));
        assert_eq!(char_jaccard("", ""), None);
    }
}
