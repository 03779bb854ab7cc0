//! Follow-up question templates keyed by (state, intent category).

use colloquy_core::models::{ConversationState, EntityMap, EntityType, IntentType};

/// A candidate question. Dropped once its target entity has been collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUpTemplate {
    pub text: &'static str,
    pub target: Option<EntityType>,
}

const fn ask(text: &'static str) -> FollowUpTemplate {
    FollowUpTemplate { text, target: None }
}

const fn ask_for(text: &'static str, target: EntityType) -> FollowUpTemplate {
    FollowUpTemplate {
        text,
        target: Some(target),
    }
}

/// Used when every candidate was filtered out, or the state has none.
pub const GENERIC_FOLLOW_UPS: [&str; 2] =
    ["What else would you like to know?", "How can I help you further?"];

static INITIAL: &[FollowUpTemplate] = &[
    ask("What would you like to know about?"),
    ask("How can I assist you today?"),
    ask("What topic interests you?"),
];

static GREETING: &[FollowUpTemplate] = &[
    ask("What brings you here today?"),
    ask("What would you like to explore?"),
    ask("How can I help you?"),
];

static GATHERING_PRODUCT: &[FollowUpTemplate] = &[
    ask_for("What's your budget range?", EntityType::PriceRange),
    ask("What will you use it for?"),
    ask_for("Any preferred brands?", EntityType::Brand),
    ask("Specific features you need?"),
];

static GATHERING: &[FollowUpTemplate] = &[
    ask("Could you provide more details?"),
    ask("What specifically are you looking for?"),
    ask("Any particular preferences?"),
];

static DISCUSSION_SPORTS: &[FollowUpTemplate] = &[
    ask_for("Which team do you support?", EntityType::Team),
    ask("What's your favorite aspect of the game?"),
    ask("Any recent matches you want to discuss?"),
    ask("Players you admire?"),
];

static DISCUSSION: &[FollowUpTemplate] = &[
    ask("What are your thoughts on this?"),
    ask("Would you like to explore another aspect?"),
    ask("What's your experience with this?"),
];

static QUESTION_ANSWERING: &[FollowUpTemplate] = &[
    ask("Does that answer your question?"),
    ask("Would you like more details?"),
    ask("Any related questions?"),
    ask("What else would you like to know?"),
];

/// Candidates for a state, specialised by intent category where a table exists.
pub fn templates_for(state: ConversationState, intent: IntentType) -> &'static [FollowUpTemplate] {
    match (state, intent.category()) {
        (ConversationState::Initial, _) => INITIAL,
        (ConversationState::Greeting, _) => GREETING,
        (ConversationState::InformationGathering, "product") => GATHERING_PRODUCT,
        (ConversationState::InformationGathering, _) => GATHERING,
        (ConversationState::Discussion, "sports") => DISCUSSION_SPORTS,
        (ConversationState::Discussion, _) => DISCUSSION,
        (ConversationState::QuestionAnswering, _) => QUESTION_ANSWERING,
        (ConversationState::FollowUp | ConversationState::Conclusion, _) => &[],
    }
}

/// Up to `max` questions not already answered by `collected`.
pub fn generate_follow_ups(
    state: ConversationState,
    intent: IntentType,
    collected: &EntityMap,
    max: usize,
) -> Vec<String> {
    let answered = |t: &FollowUpTemplate| {
        t.target
            .is_some_and(|entity| collected.get(&entity).is_some_and(|v| !v.is_empty()))
    };
    let questions: Vec<String> = templates_for(state, intent)
        .iter()
        .filter(|t| !answered(t))
        .take(max)
        .map(|t| t.text.to_string())
        .collect();

    if questions.is_empty() {
        GENERIC_FOLLOW_UPS.iter().map(|q| q.to_string()).collect()
    } else {
        questions
    }
}
