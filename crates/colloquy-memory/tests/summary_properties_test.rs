use colloquy_core::models::{ConversationState, EntityMap, IntentType};
use colloquy_memory::summary::{dominant_intent, summarize};
use proptest::prelude::*;

fn intent_strategy() -> impl Strategy<Value = IntentType> {
    (0..IntentType::COUNT).prop_map(|i| IntentType::ALL[i])
}

proptest! {
    #[test]
    fn dominant_intent_is_drawn_from_recent_window(
        intents in prop::collection::vec(intent_strategy(), 1..20)
    ) {
        let dominant = dominant_intent(&intents, 5).unwrap();
        let window_start = intents.len().saturating_sub(5);
        prop_assert!(intents[window_start..].contains(&dominant));
    }

    #[test]
    fn summary_always_ends_with_state(
        intents in prop::collection::vec(intent_strategy(), 0..12)
    ) {
        let summary = summarize(&intents, &EntityMap::new(), ConversationState::FollowUp, 5);
        prop_assert!(summary.ends_with("State: follow_up"));
    }
}
