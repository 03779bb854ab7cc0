//! One-line snapshot summaries.

use std::collections::HashMap;

use colloquy_core::models::{ConversationState, EntityMap, EntityType, IntentType};

/// `Primary intent: X | Topics: a, b, c | State: s`, omitting empty parts.
pub fn summarize(
    intents: &[IntentType],
    entities: &EntityMap,
    state: ConversationState,
    window: usize,
) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(intent) = dominant_intent(intents, window) {
        parts.push(format!("Primary intent: {intent}"));
    }
    let topics = top_entity_types(entities, 3);
    if !topics.is_empty() {
        let names: Vec<&str> = topics.iter().map(|t| t.as_str()).collect();
        parts.push(format!("Topics: {}", names.join(", ")));
    }
    parts.push(format!("State: {state}"));
    parts.join(" | ")
}

/// Most common of the last `window` intents once that many exist, else the latest.
/// Ties go to the most recent occurrence.
pub fn dominant_intent(intents: &[IntentType], window: usize) -> Option<IntentType> {
    let last = *intents.last()?;
    if window == 0 || intents.len() < window {
        return Some(last);
    }
    let recent = &intents[intents.len() - window..];
    let mut counts: HashMap<IntentType, usize> = HashMap::new();
    for intent in recent {
        *counts.entry(*intent).or_default() += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    recent
        .iter()
        .rev()
        .find(|i| counts.get(i).copied() == Some(top))
        .copied()
}

/// Entity types with the most collected values, ties in declaration order.
pub fn top_entity_types(entities: &EntityMap, n: usize) -> Vec<EntityType> {
    let mut ranked: Vec<(EntityType, usize)> = entities
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(t, values)| (*t, values.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(n).map(|(t, _)| t).collect()
}
