use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};
use colloquy_core::models::{MemoryItem, MemoryQuery, MemoryScope, MemoryType, Metadata};
use colloquy_core::traits::IMemoryStorage;
use colloquy_storage::StorageEngine;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn search_is_ordered_newest_first(offsets in proptest::collection::vec(0i64..100_000, 1..20)) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        for (i, secs) in offsets.iter().enumerate() {
            let item = MemoryItem {
                id: format!("m{i}"),
                memory_type: MemoryType::ShortTerm,
                scope: MemoryScope::Global,
                content: serde_json::json!(i),
                created_at: base + Duration::seconds(*secs),
                expires_at: None,
                access_count: 0,
                last_accessed_at: None,
                importance: 0.5,
                tags: BTreeSet::new(),
                metadata: Metadata::new(),
            };
            engine.put(&item).unwrap();
        }
        let found = engine.search(&MemoryQuery::new()).unwrap();
        prop_assert_eq!(found.len(), offsets.len());
        for pair in found.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}
