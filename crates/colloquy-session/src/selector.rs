//! Picks one follow-up question from conversation signals.

use serde::{Deserialize, Serialize};

const ENGAGEMENT: &str = "What are your thoughts on that?";
const CLARIFICATION: &str = "Could you tell me more about that?";
const CONTINUATION: &str = "What would you like to explore next?";
const FALLBACK: &str = "What else would you like to know?";

/// Depth beyond which the conversation is steered onward.
const DEEP_CONVERSATION: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpSignals {
    /// Distinct entity types collected so far.
    pub entity_count: usize,
    pub conversation_depth: usize,
    pub has_question_mark: bool,
    pub is_follow_up: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FollowUpSelector;

impl FollowUpSelector {
    /// Clarify thin follow-ups, move deep conversations on, engage with
    /// questions, otherwise take the first candidate.
    pub fn select_best(&self, available: &[String], signals: &FollowUpSignals) -> String {
        let Some(first) = available.first() else {
            return FALLBACK.to_string();
        };
        if signals.is_follow_up && signals.entity_count < 2 {
            CLARIFICATION.to_string()
        } else if signals.conversation_depth > DEEP_CONVERSATION {
            CONTINUATION.to_string()
        } else if signals.has_question_mark {
            ENGAGEMENT.to_string()
        } else {
            first.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        vec!["Any preferred brands?".into()]
    }

    #[test]
    fn empty_candidates_fall_back() {
        let picked = FollowUpSelector.select_best(&[], &FollowUpSignals::default());
        assert_eq!(picked, FALLBACK);
    }

    #[test]
    fn thin_follow_up_asks_for_clarification() {
        let signals = FollowUpSignals {
            is_follow_up: true,
            entity_count: 1,
            ..Default::default()
        };
        assert_eq!(FollowUpSelector.select_best(&candidates(), &signals), CLARIFICATION);
    }

    #[test]
    fn deep_conversation_moves_on() {
        let signals = FollowUpSignals {
            conversation_depth: 6,
            has_question_mark: true,
            ..Default::default()
        };
        assert_eq!(FollowUpSelector.select_best(&candidates(), &signals), CONTINUATION);
    }

    #[test]
    fn plain_turn_takes_first_candidate() {
        let picked = FollowUpSelector.select_best(&candidates(), &FollowUpSignals::default());
        assert_eq!(picked, "Any preferred brands?");
    }
}
