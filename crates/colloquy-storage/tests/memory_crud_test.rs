use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use colloquy_core::models::{MemoryItem, MemoryScope, MemoryType, Metadata, META_SESSION_ID, META_USER_ID};
use colloquy_core::traits::IMemoryStorage;
use colloquy_storage::StorageEngine;

fn item(memory_type: MemoryType, importance: f64) -> MemoryItem {
    let now = Utc::now();
    let mut metadata = Metadata::new();
    metadata.insert(META_USER_ID.into(), serde_json::json!("user-1"));
    metadata.insert(META_SESSION_ID.into(), serde_json::json!("sess-1"));
    MemoryItem {
        id: uuid::Uuid::new_v4().to_string(),
        memory_type,
        scope: MemoryScope::Session,
        content: serde_json::json!({"text": "hello"}),
        created_at: now,
        expires_at: Some(now + Duration::hours(1)),
        access_count: 0,
        last_accessed_at: None,
        importance,
        tags: BTreeSet::from(["conversation".to_string()]),
        metadata,
    }
}

#[test]
fn migrations_reach_latest_version() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert_eq!(
        engine.schema_version().unwrap(),
        colloquy_storage::migrations::LATEST_VERSION
    );
}

#[test]
fn put_then_get_preserves_fields() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let original = item(MemoryType::ShortTerm, 0.4);
    engine.put(&original).unwrap();

    let loaded = engine.get(&original.id).unwrap().unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn get_missing_returns_none() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert!(engine.get("nope").unwrap().is_none());
}

#[test]
fn put_replaces_existing_id() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let mut memory = item(MemoryType::LongTerm, 0.8);
    engine.put(&memory).unwrap();
    memory.importance = 0.95;
    engine.put(&memory).unwrap();

    let loaded = engine.get(&memory.id).unwrap().unwrap();
    assert_eq!(loaded.importance, 0.95);
    let counts = engine.count_by_type().unwrap();
    assert_eq!(counts, vec![(MemoryType::LongTerm, 1)]);
}

#[test]
fn touch_increments_access_counters() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = item(MemoryType::Working, 0.3);
    engine.put(&memory).unwrap();

    let at = Utc::now();
    engine.touch(&memory.id, at).unwrap();
    let touched = engine.touch(&memory.id, at).unwrap().unwrap();
    assert_eq!(touched.access_count, 2);
    assert_eq!(touched.last_accessed_at, Some(at));
}

#[test]
fn touch_missing_returns_none() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert!(engine.touch("ghost", Utc::now()).unwrap().is_none());
}

#[test]
fn delete_reports_whether_row_existed() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = item(MemoryType::Episodic, 0.6);
    engine.put(&memory).unwrap();
    assert!(engine.delete(&memory.id).unwrap());
    assert!(!engine.delete(&memory.id).unwrap());
}

#[test]
fn delete_bulk_counts_only_existing_rows() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let a = item(MemoryType::ShortTerm, 0.5);
    let b = item(MemoryType::ShortTerm, 0.5);
    engine.put(&a).unwrap();
    engine.put(&b).unwrap();

    let removed = engine
        .delete_bulk(&[a.id.clone(), "missing".into(), b.id.clone()])
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(engine.delete_bulk(&[]).unwrap(), 0);
}

#[test]
fn expiry_before_creation_is_rejected_by_schema() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let mut memory = item(MemoryType::ShortTerm, 0.5);
    memory.expires_at = Some(memory.created_at - Duration::seconds(1));
    assert!(engine.put(&memory).is_err());
}
