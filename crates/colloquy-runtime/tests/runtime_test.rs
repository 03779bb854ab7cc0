use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use colloquy_core::config::ColloquyConfig;
use colloquy_core::errors::{ColloquyError, ColloquyResult};
use colloquy_core::models::{
    ConversationSession, ConversationState, EntityType, Intent, IntentType, Response,
};
use colloquy_core::traits::IResponseGenerator;
use colloquy_runtime::{ColloquyRuntime, TemplateResponseGenerator, FALLBACK_TEXT};
use colloquy_storage::StorageEngine;
use serde_json::json;

fn runtime() -> ColloquyRuntime {
    let config = ColloquyConfig::default();
    colloquy_runtime::init_tracing(&config.observability);
    let storage = StorageEngine::open_in_memory().unwrap();
    ColloquyRuntime::new(config, Arc::new(storage)).unwrap()
}

/// Delegates to the built-in templates unless switched into a failure mode.
#[derive(Default)]
struct Flaky {
    stall: AtomicBool,
    fail: AtomicBool,
}

impl IResponseGenerator for Flaky {
    fn generate(&self, intent: &Intent, session: &ConversationSession) -> ColloquyResult<Response> {
        if self.stall.load(Ordering::SeqCst) {
            std::thread::sleep(StdDuration::from_millis(300));
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ColloquyError::validation("generator offline"));
        }
        TemplateResponseGenerator.generate(intent, session)
    }
}

fn flaky_runtime(timeout_ms: u64) -> (ColloquyRuntime, Arc<Flaky>) {
    let mut config = ColloquyConfig::default();
    config.runtime.turn_timeout_ms = timeout_ms;
    let generator = Arc::new(Flaky::default());
    let storage = StorageEngine::open_in_memory().unwrap();
    let rt = ColloquyRuntime::with_generator(
        config,
        Arc::new(storage),
        Arc::clone(&generator) as Arc<dyn IResponseGenerator>,
    )
    .unwrap();
    (rt, generator)
}

// ── turns ──

#[tokio::test]
async fn greeting_then_laptops() {
    let rt = runtime();
    let session_id = rt.create_session("alice");

    let hello = rt.process_turn(&session_id, "Hi there!").await.unwrap();
    assert!(!hello.degraded);
    assert_eq!(hello.state, ConversationState::Greeting);
    assert_eq!(hello.response.intent_type, IntentType::Greeting);
    assert_eq!(hello.response.metadata["strategy"], json!("greeting"));

    let laptops = rt
        .process_turn(&session_id, "Tell me about laptops")
        .await
        .unwrap();
    assert_eq!(laptops.state, ConversationState::InformationGathering);
    assert_eq!(
        laptops.entities_collected.get(&EntityType::ProductType),
        Some(&vec!["laptop".to_string()])
    );
    assert!(!laptops
        .follow_up_questions
        .iter()
        .any(|q| q.to_lowercase().contains("what type of product")));

    let history = rt.get_history(&session_id, 0).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].content, "Hi there!");
    assert_eq!(history[2].content, "Tell me about laptops");
}

#[tokio::test]
async fn product_advisory_is_attached_to_response() {
    let rt = runtime();
    let session_id = rt.create_session("alice");
    let result = rt
        .process_turn(&session_id, "Tell me about laptops")
        .await
        .unwrap();

    assert_eq!(result.response.metadata["advisor"], json!("product_advisor"));
    let advisory = &result.response.metadata["advisory"];
    assert_eq!(advisory["category"], json!("laptop"));
    assert!(advisory["products"]
        .as_array()
        .unwrap()
        .contains(&json!("Dell XPS 15")));

    let history = rt.get_history(&session_id, 1).await.unwrap();
    assert_eq!(history[0].metadata["advisory"], *advisory);
}

#[tokio::test]
async fn sports_turn_consults_sports_advisor() {
    let rt = runtime();
    let session_id = rt.create_session("bob");
    let result = rt
        .process_turn(&session_id, "Real Madrid football tactics")
        .await
        .unwrap();
    assert_eq!(result.response.metadata["advisor"], json!("sports_advisor"));
    assert_eq!(result.response.metadata["advisory"]["topic"], json!("tactics"));
    assert_eq!(
        result.entities_collected.get(&EntityType::Team),
        Some(&vec!["real madrid".to_string()])
    );
}

#[tokio::test]
async fn turns_feed_the_profile() {
    let rt = runtime();
    let session_id = rt.create_session("alice");
    rt.process_turn(&session_id, "Tell me about laptops").await.unwrap();
    let second = rt
        .process_turn(&session_id, "Tell me about laptops")
        .await
        .unwrap();

    let modifiers = &second.personalization_modifiers;
    assert!(modifiers
        .content_personalization
        .categories
        .contains_key("laptop"));

    let insights = rt.get_user_insights("alice").unwrap();
    assert_eq!(insights.total_interactions, 2);
    assert_eq!(insights.session_count, 1);
}

#[tokio::test]
async fn unknown_session_is_surfaced() {
    let rt = runtime();
    let err = rt.process_turn("no-such-session", "hello").await.unwrap_err();
    assert!(matches!(err, ColloquyError::SessionNotFound { .. }));
    assert!(rt.get_history("no-such-session", 0).await.is_err());
}

#[tokio::test]
async fn cleared_session_is_gone() {
    let rt = runtime();
    let session_id = rt.create_session("carol");
    rt.process_turn(&session_id, "Hi there!").await.unwrap();

    assert!(rt.clear_session(&session_id));
    assert!(!rt.clear_session(&session_id));
    assert!(matches!(
        rt.process_turn(&session_id, "still there?").await,
        Err(ColloquyError::SessionNotFound { .. })
    ));
}

// ── degradation ──

#[tokio::test]
async fn timeout_returns_fallback_and_discards_the_turn() {
    let (rt, generator) = flaky_runtime(50);
    let session_id = rt.create_session("dave");
    generator.stall.store(true, Ordering::SeqCst);

    let result = rt.process_turn(&session_id, "Hi there!").await.unwrap();
    assert!(result.degraded);
    assert_eq!(result.response.text, FALLBACK_TEXT);
    assert_eq!(result.follow_up_questions.len(), 2);
    assert_eq!(result.state, ConversationState::Initial);

    assert!(rt.get_history(&session_id, 0).await.unwrap().is_empty());
    assert_eq!(rt.get_user_insights("dave").unwrap().total_interactions, 0);
    assert_eq!(rt.active_degradation_count(), 1);
    assert!(rt.degradations()[0].event.failure.contains("exceeded 50ms"));
}

#[tokio::test]
async fn generator_error_degrades_then_recovers() {
    let (rt, generator) = flaky_runtime(5_000);
    let session_id = rt.create_session("erin");

    generator.fail.store(true, Ordering::SeqCst);
    let failed = rt.process_turn(&session_id, "Hi there!").await.unwrap();
    assert!(failed.degraded);
    assert_eq!(rt.active_degradation_count(), 1);

    generator.fail.store(false, Ordering::SeqCst);
    let ok = rt.process_turn(&session_id, "Hi there!").await.unwrap();
    assert!(!ok.degraded);
    assert_eq!(ok.state, ConversationState::Greeting);
    assert_eq!(rt.active_degradation_count(), 0);
    assert_eq!(rt.degradations().len(), 1);
}

// ── profiles ──

#[tokio::test]
async fn exported_profile_imports_into_fresh_runtime() {
    let source = runtime();
    let session_id = source.create_session("alice");
    source
        .process_turn(&session_id, "Is the Apple laptop any good?")
        .await
        .unwrap();
    let exported = source.export_profile("alice").unwrap().unwrap();

    let target = runtime();
    let imported = target.import_profile(&exported).unwrap();
    assert_eq!(imported.user_id, "alice");
    assert_eq!(target.export_profile("alice").unwrap().unwrap(), exported);
    assert_eq!(
        target.get_modifiers("alice"),
        source.get_modifiers("alice")
    );
}

#[tokio::test]
async fn malformed_import_is_surfaced() {
    let rt = runtime();
    let err = rt.import_profile(&json!({"user_id": "x"})).unwrap_err();
    assert!(matches!(err, ColloquyError::ProfileImportError(_)));
    assert!(rt.export_profile("x").unwrap().is_none());
}

// ── sweeps ──

#[tokio::test]
async fn session_sweep_purges_idle_sessions() {
    let rt = runtime();
    let session_id = rt.create_session("frank");
    let later = Utc::now() + Duration::hours(2);
    assert_eq!(rt.sweep_sessions(later), 1);
    assert!(rt.process_turn(&session_id, "hello").await.is_err());
}

#[tokio::test]
async fn context_sweep_evicts_idle_contexts() {
    let rt = runtime();
    let session_id = rt.create_session("gina");
    rt.process_turn(&session_id, "Hi there!").await.unwrap();
    assert_eq!(rt.context().active_count(), 1);

    let later = Utc::now() + Duration::hours(48);
    assert_eq!(rt.sweep_contexts(later), 1);
    assert_eq!(rt.context().active_count(), 0);
}

#[tokio::test]
async fn background_sweeps_start_and_stop() {
    let rt = Arc::new(runtime());
    let tasks = rt.spawn_background();
    assert_eq!(tasks.len(), 4);
    tokio::task::yield_now().await;
    assert!(tasks.is_running());
    tasks.shutdown().await;
}

#[tokio::test]
async fn profiles_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ColloquyConfig::default();
    config.storage.db_path = dir.path().join("colloquy.db").display().to_string();

    {
        let rt = ColloquyRuntime::open(config.clone()).unwrap();
        let session_id = rt.create_session("alice");
        rt.process_turn(&session_id, "Tell me about laptops")
            .await
            .unwrap();
    }

    let reopened = ColloquyRuntime::open(config).unwrap();
    let insights = reopened.get_user_insights("alice").unwrap();
    assert_eq!(insights.total_interactions, 1);
    assert!(reopened
        .get_modifiers("alice")
        .content_personalization
        .categories
        .contains_key("laptop"));
}
