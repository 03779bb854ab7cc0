//! Text normalization, keyword extraction and keyword similarity.

use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "and", "or", "but", "in", "with", "to", "for",
    "of", "as", "by", "that", "this", "it", "from", "be", "are", "been", "was", "were", "will",
    "would", "can", "could", "should", "may", "might", "must", "shall", "do", "does", "did",
    "have", "has", "had", "having", "i", "you", "he", "she", "we", "they", "me", "him", "her",
    "us", "them", "my", "your", "his", "its", "our", "their",
];

/// Lowercase, replace punctuation with spaces, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let spaced: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Meaningful words: normalized, stop words and words of two chars or fewer dropped.
pub fn extract_keywords(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of the two texts' keyword sets. 0.0 if either is empty.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<String> = extract_keywords(a).into_iter().collect();
    let right: HashSet<String> = extract_keywords(b).into_iter().collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f64 / union as f64
}
