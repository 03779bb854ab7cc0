use chrono::{Duration, Utc};
use colloquy_core::models::{ContextSnapshot, ConversationState, EntityMap, EntityType, IntentType};
use colloquy_core::traits::IMemoryStorage;
use colloquy_storage::StorageEngine;

fn snapshot(id: &str, user: &str, session: &str, minutes: i64) -> ContextSnapshot {
    let mut entities = EntityMap::new();
    entities.insert(EntityType::ProductType, vec!["laptop".into()]);
    ContextSnapshot {
        id: id.into(),
        user_id: user.into(),
        session_id: session.into(),
        context: serde_json::json!({"topic": "laptops", "turn": minutes}),
        timestamp: Utc::now() + Duration::minutes(minutes),
        intent_history: vec![IntentType::Greeting, IntentType::ProductInquiry],
        entity_history: entities,
        conversation_state: ConversationState::InformationGathering,
        summary: "Primary intent: product_inquiry".into(),
    }
}

#[test]
fn snapshots_round_trip() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let original = snapshot("snap-1", "u1", "s1", 0);
    engine.put_snapshot(&original).unwrap();

    let loaded = engine.get_snapshots("u1", None, 10).unwrap();
    assert_eq!(loaded, vec![original]);
}

#[test]
fn snapshots_are_newest_first_and_limited() {
    let engine = StorageEngine::open_in_memory().unwrap();
    for (i, id) in ["s-a", "s-b", "s-c"].iter().enumerate() {
        engine.put_snapshot(&snapshot(id, "u1", "sess", i as i64)).unwrap();
    }
    let latest_two = engine.get_snapshots("u1", None, 2).unwrap();
    let ids: Vec<_> = latest_two.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s-c", "s-b"]);
}

#[test]
fn session_filter_narrows_results() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.put_snapshot(&snapshot("one", "u1", "s1", 0)).unwrap();
    engine.put_snapshot(&snapshot("two", "u1", "s2", 1)).unwrap();
    engine.put_snapshot(&snapshot("three", "u2", "s1", 2)).unwrap();

    let s1 = engine.get_snapshots("u1", Some("s1"), 10).unwrap();
    assert_eq!(s1.len(), 1);
    assert_eq!(s1[0].id, "one");
}

#[test]
fn snapshot_ids_cannot_be_overwritten() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.put_snapshot(&snapshot("dup", "u1", "s1", 0)).unwrap();
    let mut changed = snapshot("dup", "u1", "s1", 1);
    changed.summary = "rewritten".into();
    assert!(engine.put_snapshot(&changed).is_err());

    let stored = engine.get_snapshots("u1", None, 10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].summary, "rewritten");
}
