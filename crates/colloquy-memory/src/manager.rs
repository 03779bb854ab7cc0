//! MemoryManager: policy-driven memory lifecycle over an `IMemoryStorage`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use colloquy_core::config::MemoryConfig;
use colloquy_core::errors::{ColloquyError, ColloquyResult};
use colloquy_core::models::{
    ContextSnapshot, ConversationState, EntityMap, IntentType, MemoryItem, MemoryQuery,
    MemoryScope, MemoryType, NewMemory, RetentionPolicy, META_SESSION_ID, META_USER_ID,
};
use colloquy_core::traits::IMemoryStorage;

use crate::sweep::{self, CleanupStats};

/// Importance given to the episodic mirror of a context snapshot.
const SNAPSHOT_MIRROR_IMPORTANCE: f64 = 0.6;
const DEFAULT_SESSION_MEMORY_LIMIT: usize = 20;

/// Aggregate view of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStatistics {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_scope: BTreeMap<String, usize>,
    pub average_importance: f64,
    pub expired_count: usize,
}

/// Typed memory store with per-tier retention.
#[derive(Clone)]
pub struct MemoryManager {
    storage: Arc<dyn IMemoryStorage>,
    config: MemoryConfig,
}

impl MemoryManager {
    pub fn new(storage: Arc<dyn IMemoryStorage>, config: MemoryConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn IMemoryStorage> {
        &self.storage
    }

    pub fn policy_for(&self, memory_type: MemoryType) -> RetentionPolicy {
        self.config.policy_for(memory_type)
    }

    /// Persist a fully formed item. Rejects out-of-range importance and
    /// expiries earlier than creation.
    pub fn store(&self, item: &MemoryItem) -> ColloquyResult<String> {
        if !(0.0..=1.0).contains(&item.importance) {
            return Err(ColloquyError::validation(format!(
                "importance {} outside [0, 1]",
                item.importance
            )));
        }
        if item.expires_at.is_some_and(|at| at < item.created_at) {
            return Err(ColloquyError::validation(
                "expiration precedes creation time",
            ));
        }
        self.storage.put(item)?;
        Ok(item.id.clone())
    }

    /// Build and persist a memory, deriving expiry from an explicit TTL or
    /// the tier policy.
    pub fn store_memory(&self, new: NewMemory, now: DateTime<Utc>) -> ColloquyResult<MemoryItem> {
        let ttl = match new.ttl_secs {
            Some(secs) if secs < 0 => {
                return Err(ColloquyError::validation(format!("negative ttl {secs}s")));
            }
            Some(secs) => Some(Duration::seconds(secs)),
            None => self.policy_for(new.memory_type).ttl(),
        };

        let mut metadata = new.metadata;
        if let Some(user_id) = new.user_id {
            metadata.insert(META_USER_ID.to_string(), serde_json::Value::String(user_id));
        }
        if let Some(session_id) = new.session_id {
            metadata.insert(
                META_SESSION_ID.to_string(),
                serde_json::Value::String(session_id),
            );
        }

        let item = MemoryItem {
            id: uuid::Uuid::new_v4().to_string(),
            memory_type: new.memory_type,
            scope: new.scope,
            content: new.content,
            created_at: now,
            expires_at: ttl.and_then(|ttl| now.checked_add_signed(ttl)),
            access_count: 0,
            last_accessed_at: None,
            importance: new.importance.clamp(0.0, 1.0),
            tags: new.tags.into_iter().collect(),
            metadata,
        };
        self.store(&item)?;
        Ok(item)
    }

    /// Fetch by id, counting the access.
    pub fn retrieve(&self, id: &str, now: DateTime<Utc>) -> ColloquyResult<Option<MemoryItem>> {
        self.storage.touch(id, now)
    }

    pub fn search(&self, query: &MemoryQuery) -> ColloquyResult<Vec<MemoryItem>> {
        self.storage.search(query)
    }

    pub fn user_memories(
        &self,
        user_id: &str,
        memory_type: Option<MemoryType>,
        limit: usize,
    ) -> ColloquyResult<Vec<MemoryItem>> {
        let mut query = MemoryQuery::new().with_user(user_id).with_limit(limit);
        query.memory_type = memory_type;
        self.storage.search(&query)
    }

    pub fn session_memories(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> ColloquyResult<Vec<MemoryItem>> {
        let query = MemoryQuery::new()
            .with_session(session_id)
            .with_limit(limit.unwrap_or(DEFAULT_SESSION_MEMORY_LIMIT));
        self.storage.search(&query)
    }

    /// Returns false when the id is unknown.
    pub fn update_importance(&self, id: &str, importance: f64) -> ColloquyResult<bool> {
        let Some(mut item) = self.storage.get(id)? else {
            return Ok(false);
        };
        item.importance = importance.clamp(0.0, 1.0);
        self.storage.put(&item)?;
        Ok(true)
    }

    pub fn add_tags(&self, id: &str, tags: &[&str]) -> ColloquyResult<bool> {
        let Some(mut item) = self.storage.get(id)? else {
            return Ok(false);
        };
        item.tags.extend(tags.iter().map(|t| t.to_string()));
        self.storage.put(&item)?;
        Ok(true)
    }

    pub fn delete(&self, id: &str) -> ColloquyResult<bool> {
        self.storage.delete(id)
    }

    /// Retention sweep over every tier.
    pub fn cleanup_memories(&self, now: DateTime<Utc>) -> ColloquyResult<CleanupStats> {
        let stats = sweep::run_sweep(self.storage.as_ref(), now, |t| self.policy_for(t))?;
        if stats.total() > 0 {
            tracing::debug!(
                expired = stats.expired,
                low_importance = stats.low_importance,
                over_limit = stats.over_limit,
                "memory sweep complete"
            );
        }
        Ok(stats)
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> ColloquyResult<MemoryStatistics> {
        let items = self.storage.search(&MemoryQuery::new())?;
        let mut stats = MemoryStatistics {
            total: items.len(),
            ..MemoryStatistics::default()
        };
        let mut importance_sum = 0.0;
        for item in &items {
            *stats
                .by_type
                .entry(item.memory_type.as_str().to_string())
                .or_default() += 1;
            *stats
                .by_scope
                .entry(item.scope.as_str().to_string())
                .or_default() += 1;
            importance_sum += item.importance;
            if item.is_expired(now) {
                stats.expired_count += 1;
            }
        }
        if !items.is_empty() {
            stats.average_importance = importance_sum / items.len() as f64;
        }
        Ok(stats)
    }

    /// Write a context snapshot and mirror it as an episodic session memory.
    /// Snapshot timestamps never go backwards within a session.
    #[allow(clippy::too_many_arguments)]
    pub fn store_conversation_context(
        &self,
        user_id: &str,
        session_id: &str,
        context: serde_json::Value,
        intent_history: Vec<IntentType>,
        entity_history: EntityMap,
        conversation_state: ConversationState,
        summary: String,
        now: DateTime<Utc>,
    ) -> ColloquyResult<ContextSnapshot> {
        let latest = self
            .storage
            .get_snapshots(user_id, Some(session_id), 1)?
            .into_iter()
            .next()
            .map(|s| s.timestamp);
        let timestamp = latest.map_or(now, |prev| prev.max(now));

        let snapshot = ContextSnapshot {
            id: format!("context_{session_id}_{}", uuid::Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            context,
            timestamp,
            intent_history,
            entity_history,
            conversation_state,
            summary,
        };
        self.storage.put_snapshot(&snapshot)?;

        let mirror = NewMemory::new(
            serde_json::json!({
                "snapshot_id": snapshot.id,
                "context": snapshot.context,
                "intent_history": snapshot.intent_history,
                "entity_history": snapshot.entity_history,
                "conversation_state": snapshot.conversation_state,
                "summary": snapshot.summary,
            }),
            MemoryType::Episodic,
            MemoryScope::Session,
        )
        .importance(SNAPSHOT_MIRROR_IMPORTANCE)
        .tags(&["conversation", "context"])
        .user(user_id)
        .session(session_id);
        self.store_memory(mirror, timestamp)?;

        tracing::debug!(snapshot_id = %snapshot.id, session_id = %session_id, "snapshot written");
        Ok(snapshot)
    }

    /// Snapshots for a user, newest first.
    pub fn conversation_history(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        limit: usize,
    ) -> ColloquyResult<Vec<ContextSnapshot>> {
        self.storage.get_snapshots(user_id, session_id, limit)
    }
}
