//! Retention sweep: expiry, importance floors and per-tier size caps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{MemoryItem, MemoryQuery, MemoryType, RetentionPolicy};
use colloquy_core::traits::IMemoryStorage;

/// Counts of memories removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupStats {
    pub expired: usize,
    pub low_importance: usize,
    pub over_limit: usize,
}

impl CleanupStats {
    pub fn total(&self) -> usize {
        self.expired + self.low_importance + self.over_limit
    }
}

/// Run one sweep over every tier.
pub fn run_sweep(
    storage: &dyn IMemoryStorage,
    now: DateTime<Utc>,
    policy_for: impl Fn(MemoryType) -> RetentionPolicy,
) -> ColloquyResult<CleanupStats> {
    let mut stats = CleanupStats {
        expired: storage.delete_expired(now)?,
        ..CleanupStats::default()
    };

    for memory_type in MemoryType::ALL {
        let policy = policy_for(memory_type);
        let items = storage.search(&MemoryQuery::new().with_type(memory_type))?;
        let plan = plan_eviction(items, &policy);
        if plan.low_importance.is_empty() && plan.over_limit.is_empty() {
            continue;
        }
        stats.low_importance += storage.delete_bulk(&plan.low_importance)?;
        stats.over_limit += storage.delete_bulk(&plan.over_limit)?;
        tracing::debug!(
            memory_type = %memory_type,
            low_importance = plan.low_importance.len(),
            over_limit = plan.over_limit.len(),
            "evicted memories"
        );
    }

    Ok(stats)
}

/// Ids chosen for deletion within one tier.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EvictionPlan {
    pub low_importance: Vec<String>,
    pub over_limit: Vec<String>,
}

/// Rank ascending by `(importance, access_count)`, drop everything under the
/// floor, then drop the lowest-ranked survivors beyond `max_items`.
pub fn plan_eviction(mut items: Vec<MemoryItem>, policy: &RetentionPolicy) -> EvictionPlan {
    items.sort_by(|a, b| {
        a.importance
            .total_cmp(&b.importance)
            .then(a.access_count.cmp(&b.access_count))
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let mut plan = EvictionPlan::default();
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if item.importance < policy.importance_floor {
            plan.low_importance.push(item.id);
        } else {
            kept.push(item.id);
        }
    }
    if kept.len() > policy.max_items {
        let excess = kept.len() - policy.max_items;
        plan.over_limit = kept.into_iter().take(excess).collect();
    }
    plan
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;
    use colloquy_core::models::{MemoryScope, Metadata};

    use super::*;

    fn item(id: &str, importance: f64, access_count: u64) -> MemoryItem {
        MemoryItem {
            id: id.to_string(),
            memory_type: MemoryType::ShortTerm,
            scope: MemoryScope::User,
            content: serde_json::Value::Null,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            expires_at: None,
            access_count,
            last_accessed_at: None,
            importance,
            tags: BTreeSet::new(),
            metadata: Metadata::new(),
        }
    }

    fn policy(max_items: usize, floor: f64) -> RetentionPolicy {
        RetentionPolicy {
            ttl_secs: None,
            max_items,
            importance_floor: floor,
        }
    }

    #[test]
    fn floor_removes_unimportant_items() {
        let plan = plan_eviction(vec![item("a", 0.1, 0), item("b", 0.9, 0)], &policy(10, 0.3));
        assert_eq!(plan.low_importance, vec!["a".to_string()]);
        assert!(plan.over_limit.is_empty());
    }

    #[test]
    fn cap_removes_lowest_ranked_first() {
        let items = vec![
            item("hot", 0.5, 9),
            item("cold", 0.5, 0),
            item("vip", 0.9, 0),
        ];
        let plan = plan_eviction(items, &policy(2, 0.0));
        assert_eq!(plan.over_limit, vec!["cold".to_string()]);
    }

    #[test]
    fn within_limits_is_a_no_op() {
        let plan = plan_eviction(vec![item("a", 0.5, 0)], &policy(5, 0.3));
        assert_eq!(plan, EvictionPlan::default());
    }
}
