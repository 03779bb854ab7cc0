//! Per-session active contexts, snapshot triggering and historic relevance.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{
    merge_entities, ContextSnapshot, ConversationState, EntityMap, IntentType, MemoryQuery,
    MemoryScope, MemoryType, NewMemory,
};

use crate::manager::MemoryManager;
use crate::relevance::context_relevance;
use crate::summary::summarize;

const WORKING_MEMORY_IMPORTANCE: f64 = 0.3;

/// In-memory context for one live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveContext {
    pub user_id: String,
    pub context: Map<String, Value>,
    /// Most recent intents, oldest first, capped at the configured length.
    pub intent_history: Vec<IntentType>,
    pub entity_history: EntityMap,
    pub conversation_state: ConversationState,
    /// State at the last snapshot; starts at `Initial`.
    pub snapshot_state: ConversationState,
    pub updates: usize,
    pub last_updated: DateTime<Utc>,
    /// Rebuilt from the latest working memory rather than held live.
    #[serde(default)]
    pub recovered: bool,
}

/// A historic snapshot scored against the current context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevantContext {
    pub snapshot: ContextSnapshot,
    pub relevance: f64,
}

/// Snapshot contents computed under the session entry, written after it is released.
struct SnapshotDraft {
    context: Value,
    intent_history: Vec<IntentType>,
    entity_history: EntityMap,
    state: ConversationState,
    summary: String,
}

pub struct ContextManager {
    memory: MemoryManager,
    active: DashMap<String, ActiveContext>,
}

impl ContextManager {
    pub fn new(memory: MemoryManager) -> Self {
        Self {
            memory,
            active: DashMap::new(),
        }
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Fold one turn into the session context. Writes a working memory every
    /// call, and a snapshot every `snapshot_interval` updates or when the
    /// state differs from the last snapshot. Returns the snapshot if one was
    /// written.
    #[allow(clippy::too_many_arguments)]
    pub fn update_context(
        &self,
        session_id: &str,
        user_id: &str,
        context: &Map<String, Value>,
        intent: IntentType,
        entities: &EntityMap,
        state: ConversationState,
        now: DateTime<Utc>,
    ) -> ColloquyResult<Option<ContextSnapshot>> {
        let config = self.memory.config();
        let (draft, working) = {
            let mut entry = self
                .active
                .entry(session_id.to_string())
                .or_insert_with(|| ActiveContext {
                    user_id: user_id.to_string(),
                    context: Map::new(),
                    intent_history: Vec::new(),
                    entity_history: EntityMap::new(),
                    conversation_state: ConversationState::Initial,
                    snapshot_state: ConversationState::Initial,
                    updates: 0,
                    last_updated: now,
                    recovered: false,
                });
            let active = entry.value_mut();

            for (key, value) in context {
                active.context.insert(key.clone(), value.clone());
            }
            active.intent_history.push(intent);
            let overflow = active
                .intent_history
                .len()
                .saturating_sub(config.intent_history_len);
            active.intent_history.drain(..overflow);
            merge_entities(&mut active.entity_history, entities);
            active.conversation_state = state;
            active.updates += 1;
            active.last_updated = now;
            active.recovered = false;

            let interval_hit =
                config.snapshot_interval > 0 && active.updates % config.snapshot_interval == 0;
            let draft = (interval_hit || state != active.snapshot_state).then(|| {
                active.snapshot_state = state;
                SnapshotDraft {
                    context: Value::Object(active.context.clone()),
                    intent_history: active.intent_history.clone(),
                    entity_history: active.entity_history.clone(),
                    state,
                    summary: summarize(
                        &active.intent_history,
                        &active.entity_history,
                        state,
                        config.summary_window,
                    ),
                }
            });

            let working = json!({
                "session_context": Value::Object(active.context.clone()),
                "last_intent": intent,
                "last_entities": entities,
                "conversation_state": state,
            });
            (draft, working)
        };

        let item = NewMemory::new(working, MemoryType::Working, MemoryScope::Session)
            .importance(WORKING_MEMORY_IMPORTANCE)
            .tags(&["working", "session"])
            .user(user_id)
            .session(session_id);
        self.memory.store_memory(item, now)?;

        draft
            .map(|d| {
                self.memory.store_conversation_context(
                    user_id,
                    session_id,
                    d.context,
                    d.intent_history,
                    d.entity_history,
                    d.state,
                    d.summary,
                    now,
                )
            })
            .transpose()
    }

    /// The live context, or one recovered from the latest working memory.
    pub fn get_context(&self, session_id: &str) -> ColloquyResult<Option<ActiveContext>> {
        if let Some(active) = self.active.get(session_id) {
            return Ok(Some(active.clone()));
        }

        let query = MemoryQuery::new()
            .with_session(session_id)
            .with_type(MemoryType::Working)
            .with_limit(1);
        let Some(latest) = self.memory.search(&query)?.into_iter().next() else {
            return Ok(None);
        };

        let context = latest
            .content
            .get("session_context")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let intent_history = latest
            .content
            .get("last_intent")
            .and_then(|v| serde_json::from_value::<IntentType>(v.clone()).ok())
            .into_iter()
            .collect();
        let entity_history = latest
            .content
            .get("last_entities")
            .and_then(|v| serde_json::from_value::<EntityMap>(v.clone()).ok())
            .unwrap_or_default();
        let conversation_state = latest
            .content
            .get("conversation_state")
            .and_then(|v| serde_json::from_value::<ConversationState>(v.clone()).ok())
            .unwrap_or(ConversationState::Initial);

        Ok(Some(ActiveContext {
            user_id: latest.user_id().unwrap_or_default().to_string(),
            context,
            intent_history,
            entity_history,
            conversation_state,
            snapshot_state: conversation_state,
            updates: 0,
            last_updated: latest.created_at,
            recovered: true,
        }))
    }

    /// Recent snapshots for the user scored against `current`, best first.
    pub fn get_relevant_context(
        &self,
        user_id: &str,
        current: &Value,
    ) -> ColloquyResult<Vec<RelevantContext>> {
        let config = self.memory.config();
        let candidates =
            self.memory
                .conversation_history(user_id, None, config.relevance_candidates)?;

        let mut scored: Vec<RelevantContext> = candidates
            .into_iter()
            .map(|snapshot| RelevantContext {
                relevance: context_relevance(current, &snapshot.context),
                snapshot,
            })
            .filter(|c| c.relevance >= config.relevance_threshold)
            .collect();
        scored.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        scored.truncate(config.relevant_context_limit);
        Ok(scored)
    }

    /// Drop the live context and its working memories. Snapshots are kept.
    pub fn clear_session_context(&self, session_id: &str) -> ColloquyResult<usize> {
        self.active.remove(session_id);
        let query = MemoryQuery::new()
            .with_session(session_id)
            .with_type(MemoryType::Working);
        let ids: Vec<String> = self
            .memory
            .search(&query)?
            .into_iter()
            .map(|item| item.id)
            .collect();
        self.memory.storage().delete_bulk(&ids)
    }

    /// Evict live contexts idle for longer than `max_age`.
    pub fn cleanup_inactive_contexts(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let stale: Vec<String> = self
            .active
            .iter()
            .filter(|entry| now - entry.last_updated > max_age)
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for session_id in stale {
            if self
                .active
                .remove_if(&session_id, |_, ctx| now - ctx.last_updated > max_age)
                .is_some()
            {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "evicted inactive contexts");
        }
        removed
    }
}
