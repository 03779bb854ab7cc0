use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use colloquy_core::config::DialogueConfig;
use colloquy_core::errors::DelegationError;
use colloquy_core::models::{
    ContextFlags, ConversationSession, ConversationState, EntityMap, EntityType, Intent,
    IntentType, Metadata, Response,
};
use colloquy_core::traits::{AdvisorRequest, IDomainAdvisor};
use colloquy_session::{DialogueEngine, TurnOutcome, GENERIC_FOLLOW_UPS};
use proptest::prelude::*;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

fn intent(intent_type: IntentType, entities: &[(EntityType, &str)]) -> Intent {
    let mut map = EntityMap::new();
    for (entity, value) in entities {
        map.entry(*entity).or_default().push(value.to_string());
    }
    Intent {
        intent_type,
        confidence: 0.9,
        entities: map,
        flags: ContextFlags::default(),
    }
}

fn follow_up(mut i: Intent) -> Intent {
    i.flags.is_follow_up = true;
    i
}

fn reply(text: &str, intent_type: IntentType) -> Response {
    Response {
        text: text.to_string(),
        confidence: 0.9,
        intent_type,
        follow_up_questions: Vec::new(),
        metadata: Metadata::new(),
    }
}

fn turn(
    engine: &DialogueEngine,
    session: &mut ConversationSession,
    i: Intent,
    secs: i64,
) -> TurnOutcome {
    let response = reply("ok", i.intent_type);
    engine.apply_turn(session, "utterance", &i, &response, at(secs))
}

// ── transitions through the engine ──

#[test]
fn greeting_then_product_inquiry() {
    let engine = DialogueEngine::default();
    let mut session = ConversationSession::new("u1", at(0));

    let first = turn(&engine, &mut session, intent(IntentType::Greeting, &[]), 1);
    assert_eq!(first.previous_state, ConversationState::Initial);
    assert_eq!(first.state, ConversationState::Greeting);

    let second = turn(
        &engine,
        &mut session,
        intent(IntentType::ProductInquiry, &[(EntityType::ProductType, "laptop")]),
        2,
    );
    assert_eq!(second.state, ConversationState::InformationGathering);
    assert_eq!(
        second.follow_up_questions,
        vec![
            "What's your budget range?",
            "What will you use it for?",
            "Any preferred brands?"
        ]
    );
    assert_eq!(
        session.entities_collected.get(&EntityType::ProductType),
        Some(&vec!["laptop".to_string()])
    );
    assert_eq!(session.turn_log.len(), 4);
    assert_eq!(session.last_activity_at, at(2));
}

#[test]
fn answered_questions_are_dropped() {
    let engine = DialogueEngine::default();
    let mut session = ConversationSession::new("u1", at(0));
    let outcome = turn(
        &engine,
        &mut session,
        intent(
            IntentType::ProductInquiry,
            &[
                (EntityType::ProductType, "laptop"),
                (EntityType::Brand, "dell"),
                (EntityType::PriceRange, "under $800"),
            ],
        ),
        1,
    );
    assert_eq!(
        outcome.follow_up_questions,
        vec!["What will you use it for?", "Specific features you need?"]
    );
}

#[test]
fn states_without_templates_use_generic_questions() {
    let engine = DialogueEngine::default();
    let mut session = ConversationSession::new("u1", at(0));
    let outcome = turn(&engine, &mut session, intent(IntentType::Farewell, &[]), 1);
    assert_eq!(outcome.state, ConversationState::Conclusion);
    assert_eq!(outcome.follow_up_questions, GENERIC_FOLLOW_UPS.to_vec());
}

#[test]
fn follow_up_stays_in_gathering() {
    let engine = DialogueEngine::default();
    let mut session = ConversationSession::new("u1", at(0));
    turn(&engine, &mut session, intent(IntentType::ProductInquiry, &[]), 1);
    let outcome = turn(
        &engine,
        &mut session,
        follow_up(intent(IntentType::GeneralQuestion, &[])),
        2,
    );
    assert_eq!(outcome.state, ConversationState::InformationGathering);
    assert_eq!(session.context.conversation_depth, 2);
}

#[test]
fn long_sessions_collapse_to_discussion_but_can_conclude() {
    let engine = DialogueEngine::default();
    let mut session = ConversationSession::new("u1", at(0));
    for i in 0..5 {
        turn(&engine, &mut session, intent(IntentType::GeneralQuestion, &[]), i);
    }
    assert_eq!(session.state, ConversationState::QuestionAnswering);
    assert_eq!(session.turn_log.len(), 10);

    let sixth = turn(&engine, &mut session, intent(IntentType::GeneralQuestion, &[]), 6);
    assert_eq!(sixth.state, ConversationState::Discussion);

    let bye = turn(&engine, &mut session, intent(IntentType::Farewell, &[]), 7);
    assert_eq!(bye.state, ConversationState::Conclusion);

    let back = turn(&engine, &mut session, intent(IntentType::Greeting, &[]), 8);
    assert_eq!(back.state, ConversationState::Discussion);
}

#[test]
fn turn_limit_is_configurable() {
    let engine = DialogueEngine::new(DialogueConfig {
        gathering_turn_limit: 100,
        ..DialogueConfig::default()
    });
    let mut session = ConversationSession::new("u1", at(0));
    for i in 0..8 {
        turn(&engine, &mut session, intent(IntentType::GeneralQuestion, &[]), i);
    }
    assert_eq!(session.state, ConversationState::QuestionAnswering);
}

#[test]
fn context_tracks_last_intent_and_strategy() {
    let engine = DialogueEngine::default();
    let mut session = ConversationSession::new("u1", at(0));
    let mut response = reply("hello!", IntentType::Greeting);
    response
        .metadata
        .insert("strategy".into(), serde_json::json!("greeting"));
    engine.apply_turn(
        &mut session,
        "hi",
        &intent(IntentType::Greeting, &[]),
        &response,
        at(1),
    );
    assert_eq!(session.context.last_intent, Some(IntentType::Greeting));
    assert_eq!(session.context.message_count, 1);
    assert_eq!(session.context.last_response_strategy.as_deref(), Some("greeting"));
    assert_eq!(session.turn_log[1].content, "hello!");
}

#[test]
fn depth_counts_user_messages_across_state_changes() {
    let engine = DialogueEngine::default();
    let mut session = ConversationSession::new("u1", at(0));
    turn(&engine, &mut session, intent(IntentType::Greeting, &[]), 1);
    turn(&engine, &mut session, intent(IntentType::ProductInquiry, &[]), 2);
    turn(&engine, &mut session, intent(IntentType::SportsTopic, &[]), 3);
    assert_eq!(session.context.conversation_depth, 3);
    assert_eq!(session.context.message_count, 3);
}

// ── advisors ──

struct CountingAdvisor {
    seen_history: AtomicUsize,
    fail: bool,
}

impl IDomainAdvisor for CountingAdvisor {
    fn name(&self) -> &str {
        "counting"
    }

    fn intent_type(&self) -> IntentType {
        IntentType::SportsTopic
    }

    fn advise(&self, request: &AdvisorRequest<'_>) -> Result<serde_json::Value, DelegationError> {
        self.seen_history
            .store(request.history.len(), Ordering::SeqCst);
        if self.fail {
            return Err(DelegationError::AdvisorFailed {
                advisor: "counting".into(),
                reason: "offline".into(),
            });
        }
        Ok(serde_json::json!({"topic": "football", "utterance": request.utterance}))
    }
}

#[test]
fn advisor_payload_lands_in_turn_metadata() {
    let advisor = Arc::new(CountingAdvisor {
        seen_history: AtomicUsize::new(0),
        fail: false,
    });
    let engine = DialogueEngine::default().with_advisor(advisor.clone());
    let mut session = ConversationSession::new("u1", at(0));
    for i in 0..3 {
        turn(&engine, &mut session, intent(IntentType::SportsTopic, &[]), i);
    }
    let outcome = turn(&engine, &mut session, intent(IntentType::SportsTopic, &[]), 4);

    let advisory = outcome.advisory.unwrap();
    assert_eq!(advisory.advisor, "counting");
    assert_eq!(advisor.seen_history.load(Ordering::SeqCst), 4);
    let last = session.turn_log.last().unwrap();
    assert_eq!(last.metadata["advisory"]["topic"], serde_json::json!("football"));
}

#[test]
fn advisor_failure_is_swallowed() {
    let engine = DialogueEngine::default().with_advisor(Arc::new(CountingAdvisor {
        seen_history: AtomicUsize::new(0),
        fail: true,
    }));
    let mut session = ConversationSession::new("u1", at(0));
    let outcome = turn(&engine, &mut session, intent(IntentType::SportsTopic, &[]), 1);
    assert!(outcome.advisor_failed);
    assert!(outcome.advisory.is_none());
    assert_eq!(outcome.state, ConversationState::Discussion);
}

#[test]
fn advisors_only_run_for_their_intent() {
    let advisor = Arc::new(CountingAdvisor {
        seen_history: AtomicUsize::new(0),
        fail: false,
    });
    let engine = DialogueEngine::default().with_advisor(advisor.clone());
    let mut session = ConversationSession::new("u1", at(0));
    let outcome = turn(&engine, &mut session, intent(IntentType::Greeting, &[]), 1);
    assert!(outcome.advisory.is_none());
    assert_eq!(advisor.seen_history.load(Ordering::SeqCst), 0);
}

// ── invariants ──

fn entity_strategy() -> impl Strategy<Value = (EntityType, String)> {
    (
        prop::sample::select(EntityType::ALL.to_vec()),
        prop::sample::select(vec!["laptop", "dell", "nba", "arsenal", "cheap"]),
    )
        .prop_map(|(t, v)| (t, v.to_string()))
}

proptest! {
    #[test]
    fn collected_entities_never_duplicate(
        turns in prop::collection::vec(prop::collection::vec(entity_strategy(), 0..4), 1..12)
    ) {
        let engine = DialogueEngine::default();
        let mut session = ConversationSession::new("u1", at(0));
        for (i, entities) in turns.iter().enumerate() {
            let pairs: Vec<(EntityType, &str)> =
                entities.iter().map(|(t, v)| (*t, v.as_str())).collect();
            turn(&engine, &mut session, intent(IntentType::ProductInquiry, &pairs), i as i64);
        }
        for values in session.entities_collected.values() {
            let mut deduped = values.clone();
            deduped.sort();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), values.len());
        }
    }
}
