//! The dialogue automaton. Transitions are data: one row per state.

use colloquy_core::models::{ConversationState as S, IntentType as I};

type Row = (S, &'static [(I, S)]);

/// Per-state intent → next-state map. Unmapped intents keep the state.
/// `Farewell` is handled for every state in [`table_lookup`].
static TRANSITIONS: &[Row] = &[
    (
        S::Initial,
        &[
            (I::Greeting, S::Greeting),
            (I::HelpRequest, S::InformationGathering),
            (I::ProductInquiry, S::InformationGathering),
            (I::SportsTopic, S::Discussion),
            (I::GeneralQuestion, S::QuestionAnswering),
            (I::Conversation, S::Discussion),
        ],
    ),
    (
        S::Greeting,
        &[
            (I::HelpRequest, S::InformationGathering),
            (I::ProductInquiry, S::InformationGathering),
            (I::SportsTopic, S::Discussion),
            (I::GeneralQuestion, S::QuestionAnswering),
            (I::Conversation, S::Discussion),
        ],
    ),
    (
        S::InformationGathering,
        &[
            (I::ProductInquiry, S::InformationGathering),
            (I::GeneralQuestion, S::QuestionAnswering),
            (I::Conversation, S::Discussion),
        ],
    ),
    (
        S::Discussion,
        &[
            (I::SportsTopic, S::Discussion),
            (I::ProductInquiry, S::InformationGathering),
            (I::GeneralQuestion, S::QuestionAnswering),
            (I::Conversation, S::Discussion),
            (I::HelpRequest, S::FollowUp),
        ],
    ),
    (
        S::QuestionAnswering,
        &[
            (I::GeneralQuestion, S::QuestionAnswering),
            (I::ProductInquiry, S::InformationGathering),
            (I::SportsTopic, S::Discussion),
            (I::Conversation, S::Discussion),
            (I::HelpRequest, S::FollowUp),
        ],
    ),
    (
        S::FollowUp,
        &[
            (I::GeneralQuestion, S::QuestionAnswering),
            (I::ProductInquiry, S::InformationGathering),
            (I::SportsTopic, S::Discussion),
            (I::Conversation, S::Discussion),
            (I::HelpRequest, S::InformationGathering),
        ],
    ),
    (
        S::Conclusion,
        &[
            (I::Greeting, S::Greeting),
            (I::HelpRequest, S::InformationGathering),
            (I::ProductInquiry, S::InformationGathering),
            (I::SportsTopic, S::Discussion),
            (I::GeneralQuestion, S::QuestionAnswering),
            (I::Conversation, S::Discussion),
        ],
    ),
];

/// Per-turn inputs to the overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionContext {
    pub is_follow_up: bool,
    /// Entries in the turn log, both speakers, including the current turn.
    pub turn_count: usize,
}

/// Raw table lookup, without overrides.
pub fn table_lookup(state: S, intent: I) -> Option<S> {
    if intent == I::Farewell {
        return Some(S::Conclusion);
    }
    TRANSITIONS
        .iter()
        .find(|(from, _)| *from == state)
        .and_then(|(_, row)| row.iter().find(|(i, _)| *i == intent))
        .map(|(_, to)| *to)
}

/// Next state after applying the table and both overrides.
pub fn transition(state: S, intent: I, ctx: &TransitionContext, turn_limit: usize) -> S {
    let mut next = table_lookup(state, intent).unwrap_or(state);

    if ctx.is_follow_up && matches!(state, S::InformationGathering | S::Discussion) {
        next = state;
    }
    if ctx.turn_count > turn_limit && next != S::Conclusion {
        next = S::Discussion;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_a_row() {
        for state in S::ALL {
            assert!(TRANSITIONS.iter().any(|(s, _)| *s == state), "{state}");
        }
    }

    #[test]
    fn farewell_concludes_from_anywhere() {
        for state in S::ALL {
            assert_eq!(table_lookup(state, I::Farewell), Some(S::Conclusion));
        }
    }

    #[test]
    fn unmapped_intent_keeps_state() {
        let ctx = TransitionContext::default();
        assert_eq!(
            transition(S::InformationGathering, I::SportsTopic, &ctx, 10),
            S::InformationGathering
        );
        assert_eq!(transition(S::Greeting, I::Unknown, &ctx, 10), S::Greeting);
    }
}
