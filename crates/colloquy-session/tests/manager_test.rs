use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use colloquy_core::models::{
    ContextFlags, ConversationState, EntityMap, Intent, IntentType, Metadata, Response,
};
use colloquy_core::ColloquyError;
use colloquy_session::{DialogueEngine, SessionManager};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap() + Duration::seconds(secs)
}

fn manager() -> SessionManager {
    SessionManager::new(Arc::new(DialogueEngine::default()))
}

fn greeting() -> (Intent, Response) {
    let intent = Intent {
        intent_type: IntentType::Greeting,
        confidence: 0.9,
        entities: EntityMap::new(),
        flags: ContextFlags::default(),
    };
    let response = Response {
        text: "Hello!".into(),
        confidence: 0.9,
        intent_type: IntentType::Greeting,
        follow_up_questions: Vec::new(),
        metadata: Metadata::new(),
    };
    (intent, response)
}

// ── lifecycle ──

#[tokio::test]
async fn unknown_session_is_not_found() {
    let mgr = manager();
    let err = mgr.acquire("nope", at(0)).await.unwrap_err();
    assert!(matches!(err, ColloquyError::SessionNotFound { .. }));
}

#[tokio::test]
async fn created_session_starts_initial() {
    let mgr = manager();
    let id = mgr.create_session("u1", at(0));
    let session = mgr.acquire(&id, at(1)).await.unwrap();
    assert_eq!(session.state, ConversationState::Initial);
    assert_eq!(session.user_id, "u1");
    assert_eq!(mgr.active_session_count(), 1);
}

#[tokio::test]
async fn expired_session_is_purged_on_access() {
    let mgr = manager();
    let id = mgr.create_session("u1", at(0));
    let err = mgr.acquire(&id, at(3_601)).await.unwrap_err();
    assert!(matches!(err, ColloquyError::SessionNotFound { .. }));
    assert_eq!(mgr.active_session_count(), 0);
}

#[tokio::test]
async fn session_at_exact_timeout_is_still_live() {
    let mgr = manager();
    let id = mgr.create_session("u1", at(0));
    assert!(mgr.acquire(&id, at(3_600)).await.is_ok());
}

#[tokio::test]
async fn process_message_updates_state_and_activity() {
    let mgr = manager();
    let id = mgr.create_session("u1", at(0));
    let (intent, response) = greeting();
    let outcome = mgr
        .process_message(&id, "hi", &intent, &response, at(10))
        .await
        .unwrap();
    assert_eq!(outcome.state, ConversationState::Greeting);

    // Idle time is measured from the turn at t=10.
    assert!(mgr.acquire(&id, at(3_610)).await.is_ok());
}

#[tokio::test]
async fn history_respects_limit() {
    let mgr = manager();
    let id = mgr.create_session("u1", at(0));
    let (intent, response) = greeting();
    for i in 0..3 {
        mgr.process_message(&id, "hi", &intent, &response, at(i))
            .await
            .unwrap();
    }
    assert_eq!(mgr.get_history(&id, 0, at(5)).await.unwrap().len(), 6);
    let recent = mgr.get_history(&id, 2, at(5)).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].content, "Hello!");
}

#[tokio::test]
async fn clear_session_forgets_it() {
    let mgr = manager();
    let id = mgr.create_session("u1", at(0));
    assert!(mgr.clear_session(&id));
    assert!(!mgr.clear_session(&id));
    assert!(mgr.acquire(&id, at(1)).await.is_err());
}

#[tokio::test]
async fn summary_counts_turns() {
    let mgr = manager();
    let id = mgr.create_session("u1", at(0));
    let (intent, response) = greeting();
    mgr.process_message(&id, "hi", &intent, &response, at(60))
        .await
        .unwrap();
    let summary = mgr.summary(&id, at(120)).await.unwrap();
    assert_eq!(summary.total_turns, 2);
    assert_eq!(summary.user_turns, 1);
    assert_eq!(summary.assistant_turns, 1);
    assert_eq!(summary.state, ConversationState::Greeting);
    assert_eq!(summary.duration_secs, 120);
}

// ── cleanup ──

#[tokio::test]
async fn cleanup_skips_sessions_locked_by_a_turn() {
    let mgr = manager();
    let busy = mgr.create_session("u1", at(0));
    let idle = mgr.create_session("u2", at(0));
    let fresh = mgr.create_session("u3", at(7_000));

    let guard = mgr.acquire(&busy, at(0)).await.unwrap();
    let removed = mgr.cleanup_expired_sessions(at(7_200));
    assert_eq!(removed, 1);
    assert_eq!(mgr.active_session_count(), 2);
    drop(guard);

    assert!(mgr.acquire(&idle, at(7_200)).await.is_err());
    assert!(mgr.acquire(&fresh, at(7_200)).await.is_ok());
    assert_eq!(mgr.cleanup_expired_sessions(at(7_200)), 1);
}

// ── serialization ──

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_turns_on_one_session_serialize() {
    let mgr = Arc::new(manager());
    let id = mgr.create_session("u1", at(0));
    let mut tasks = Vec::new();
    for i in 0..16 {
        let mgr = Arc::clone(&mgr);
        let id = id.clone();
        tasks.push(tokio::spawn(async move {
            let (intent, response) = greeting();
            mgr.process_message(&id, "hi", &intent, &response, at(i))
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    let history = mgr.get_history(&id, 0, at(20)).await.unwrap();
    assert_eq!(history.len(), 32);
}
