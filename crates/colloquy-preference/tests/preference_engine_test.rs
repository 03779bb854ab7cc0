use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use colloquy_core::config::{MemoryConfig, PreferenceConfig};
use colloquy_core::models::{
    ContextFlags, EntityMap, EntityType, Intent, IntentType, PersonalizationLevel,
    PreferenceObservation, PreferenceType, PreferenceValue,
};
use colloquy_memory::MemoryManager;
use colloquy_preference::PreferenceEngine;
use colloquy_storage::StorageEngine;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn intent_with(intent_type: IntentType, entity: EntityType, value: &str) -> Intent {
    let mut entities = EntityMap::new();
    entities.insert(entity, vec![value.to_string()]);
    Intent {
        intent_type,
        confidence: 0.9,
        entities,
        flags: ContextFlags::default(),
    }
}

fn laptop_intent() -> Intent {
    intent_with(IntentType::ProductInquiry, EntityType::ProductType, "laptop")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── merge through updates ──

#[test]
fn repeated_laptop_interest_accumulates_weight() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    let now = base_time();
    engine.update_preferences("u1", "Tell me about laptops", &laptop_intent(), now);
    engine.update_preferences("u1", "Tell me about laptops", &laptop_intent(), now);

    let profile = engine.get_profile("u1").unwrap();
    let laptop = profile.get(PreferenceType::ProductCategory, "laptop").unwrap();
    assert!(close(laptop.weight, 1.4));
    assert!(close(laptop.confidence, 0.6));
    assert_eq!(laptop.access_count, 1);
    assert_eq!(profile.total_interactions, 2);
}

#[test]
fn weight_is_capped() {
    let mut config = PreferenceConfig::default();
    config.weight_cap = 2.0;
    let engine = PreferenceEngine::new(config);
    for _ in 0..5 {
        engine.update_preferences("u1", "laptops", &laptop_intent(), base_time());
    }
    let profile = engine.get_profile("u1").unwrap();
    let laptop = profile.get(PreferenceType::ProductCategory, "laptop").unwrap();
    assert!(close(laptop.weight, 2.0));
}

#[test]
fn observations_apply_interaction_counters() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    let flags = ContextFlags {
        word_count: 4,
        has_question_mark: true,
        has_exclamation: true,
        ..ContextFlags::default()
    };
    let obs = vec![PreferenceObservation {
        preference_type: PreferenceType::Brand,
        key: "apple".into(),
        value: PreferenceValue::Number(0.5),
        confidence: 0.6,
        weight: 0.7,
    }];
    let touched = engine.apply_observations("u1", &flags, &obs, base_time());
    assert_eq!(touched.len(), 1);

    let profile = engine.get_profile("u1").unwrap();
    assert_eq!(profile.interaction_patterns.questions_asked, 1);
    assert_eq!(profile.interaction_patterns.exclamations, 1);
    assert_eq!(profile.interaction_patterns.total_words, 4);
}

// ── tier & modifiers ──

#[test]
fn tier_takes_weaker_of_count_and_confidence() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    engine.update_preferences("u1", "Tell me about laptops", &laptop_intent(), base_time());
    let profile = engine.get_profile("u1").unwrap();
    assert_eq!(profile.preference_count(), 4);
    assert_eq!(profile.personalization_level, PersonalizationLevel::Basic);
}

#[test]
fn modifiers_reflect_profile_and_are_idempotent() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    let mut intent = laptop_intent();
    intent.entities.insert(EntityType::Brand, vec!["apple".into()]);
    engine.update_preferences("u1", "Tell me about laptops", &intent, base_time());

    let first = engine.get_modifiers("u1");
    let second = engine.get_modifiers("u1");
    assert_eq!(first, second);

    assert_eq!(first.conversation_style, "concise");
    assert_eq!(first.response_length, "short");
    assert!(first.topic_preferences.contains_key("product_inquiry"));
    assert_eq!(first.content_personalization.categories.get("laptop"), Some(&0.6));
    assert_eq!(first.content_personalization.preferred_brands, vec!["apple".to_string()]);
    let level = engine.get_profile("u1").unwrap().personalization_level;
    assert_eq!(level, PersonalizationLevel::Intermediate);
    assert!(close(first.confidence_boost, level.confidence_boost()));
}

#[test]
fn unknown_user_gets_default_modifiers_without_a_profile() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    let modifiers = engine.get_modifiers("nobody");
    assert_eq!(modifiers.conversation_style, "balanced");
    assert_eq!(modifiers.response_length, "medium");
    assert_eq!(engine.profile_count(), 0);
}

// ── decay ──

#[test]
fn decay_sweep_does_not_compound_and_prunes() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    let t0 = base_time();
    engine.update_preferences("u1", "laptops", &laptop_intent(), t0);

    let later = t0 + Duration::days(3);
    let stats = engine.apply_decay_all(later);
    assert!(stats.decayed > 0);
    let once = engine.get_profile("u1").unwrap();
    let laptop = once.get(PreferenceType::ProductCategory, "laptop").unwrap();
    assert!(close(laptop.weight, 0.7 * 0.95f64.powi(3)));

    engine.apply_decay_all(later + Duration::hours(5));
    assert_eq!(engine.get_profile("u1").unwrap(), once);

    engine.apply_decay_all(t0 + Duration::days(30));
    let emptied = engine.get_profile("u1").unwrap();
    assert_eq!(emptied.preference_count(), 0);
    assert!(emptied.preferences.is_empty());
    assert_eq!(emptied.personalization_level, PersonalizationLevel::None);
}

// ── insights & similarity ──

#[test]
fn insights_summarize_profile() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    engine.update_preferences("u1", "laptops", &laptop_intent(), base_time());
    engine.record_session("u1", base_time());

    let insights = engine.get_user_insights("u1").unwrap();
    assert_eq!(insights.total_preferences, 4);
    assert_eq!(insights.session_count, 1);
    assert_eq!(insights.top_topics[0].key, "product_inquiry");
    let category = &insights.preference_summary[&PreferenceType::ProductCategory];
    assert_eq!(category.count, 1);
    assert_eq!(category.top_preferences[0].key, "laptop");
    assert_eq!(insights.behavioral_patterns.interaction_frequency, "low");
    assert!(close(insights.behavioral_patterns.exploration_tendency, 0.2));
    assert!(engine.get_user_insights("ghost").is_none());
}

#[test]
fn similar_users_share_interests() {
    let engine = PreferenceEngine::new(PreferenceConfig::default());
    let now = base_time();
    engine.update_preferences("alice", "laptops", &laptop_intent(), now);
    engine.update_preferences("bob", "laptops", &laptop_intent(), now);
    engine.update_preferences(
        "carol",
        "football",
        &intent_with(IntentType::SportsTopic, EntityType::Team, "arsenal"),
        now,
    );

    let similar = engine.get_similar_users("alice", 5);
    let ranked: Vec<&str> = similar.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ranked, vec!["bob", "carol"]);
    assert!(similar[0].1 > similar[1].1);
    assert!(engine.get_similar_users("alice", 0).is_empty());
    assert!(engine.get_similar_users("ghost", 5).is_empty());
}

// ── persistence ──

#[test]
fn profiles_reload_from_memory_store() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let memory = MemoryManager::new(storage, MemoryConfig::default());

    let first = PreferenceEngine::with_memory(PreferenceConfig::default(), memory.clone());
    first.update_preferences("u1", "laptops", &laptop_intent(), base_time());
    let saved = first.get_profile("u1").unwrap();

    let second = PreferenceEngine::with_memory(PreferenceConfig::default(), memory);
    assert_eq!(second.profile_count(), 0);
    assert_eq!(second.get_profile("u1"), Some(saved));
    assert_eq!(second.profile_count(), 1);
}

#[test]
fn concurrent_updates_persist_the_latest_profile() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let memory = MemoryManager::new(storage, MemoryConfig::default());
    let live = PreferenceEngine::with_memory(PreferenceConfig::default(), memory.clone());
    let users: Vec<String> = (0..10).map(|i| format!("user-{i}")).collect();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for round in 0..20 {
                    for user in &users {
                        let at = base_time() + Duration::seconds(round);
                        live.update_preferences(user, "laptops", &laptop_intent(), at);
                    }
                }
            });
        }
    });

    let reloaded = PreferenceEngine::with_memory(PreferenceConfig::default(), memory);
    for user in &users {
        let expected = live.get_profile(user).unwrap();
        assert_eq!(expected.total_interactions, 160);
        assert_eq!(reloaded.get_profile(user), Some(expected));
    }
}
