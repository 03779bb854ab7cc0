use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityMap;
use super::intent::IntentType;
use super::session::{ConversationState, Metadata};

/// Retention tiers. Each has its own TTL, size cap and importance floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    ShortTerm,
    LongTerm,
    Episodic,
    Semantic,
    Working,
}

impl MemoryType {
    pub const ALL: [MemoryType; 5] = [
        Self::ShortTerm,
        Self::LongTerm,
        Self::Episodic,
        Self::Semantic,
        Self::Working,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
            Self::Episodic => "episodic",
            Self::Semantic => "semantic",
            Self::Working => "working",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryScope {
    Session,
    User,
    Global,
    Topic,
}

impl MemoryScope {
    pub const ALL: [MemoryScope; 4] = [Self::Session, Self::User, Self::Global, Self::Topic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::User => "user",
            Self::Global => "global",
            Self::Topic => "topic",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

/// Metadata key holding the owning user id.
pub const META_USER_ID: &str = "user_id";
/// Metadata key holding the owning session id.
pub const META_SESSION_ID: &str = "session_id";

/// A typed, scoped memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: String,
    pub memory_type: MemoryType,
    pub scope: MemoryScope,
    /// Opaque payload.
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at`.
    pub expires_at: Option<DateTime<Utc>>,
    pub access_count: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub importance: f64,
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl MemoryItem {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.metadata.get(META_USER_ID).and_then(|v| v.as_str())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.metadata.get(META_SESSION_ID).and_then(|v| v.as_str())
    }
}

/// Per-type lifecycle rules applied by the retention sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// None means items never expire by age.
    pub ttl_secs: Option<u64>,
    pub max_items: usize,
    pub importance_floor: f64,
}

impl RetentionPolicy {
    /// Compiled default policy for a tier.
    pub fn default_for(memory_type: MemoryType) -> Self {
        const HOUR: u64 = 3_600;
        const DAY: u64 = 24 * HOUR;
        let (ttl_secs, max_items, importance_floor) = match memory_type {
            MemoryType::ShortTerm => (Some(HOUR), 100, 0.3),
            MemoryType::LongTerm => (Some(30 * DAY), 1_000, 0.7),
            MemoryType::Episodic => (Some(7 * DAY), 500, 0.5),
            MemoryType::Semantic => (None, 2_000, 0.8),
            MemoryType::Working => (Some(30 * 60), 50, 0.2),
        };
        Self {
            ttl_secs,
            max_items,
            importance_floor,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(Duration::seconds)
    }
}

/// Filter accepted by memory search. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryQuery {
    pub memory_type: Option<MemoryType>,
    pub scope: Option<MemoryScope>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    /// Every listed tag must be present.
    pub tags: Vec<String>,
    pub limit: Option<usize>,
}

impl MemoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = Some(memory_type);
        self
    }

    pub fn with_scope(mut self, scope: MemoryScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for creating a memory with policy-driven expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemory {
    pub content: serde_json::Value,
    pub memory_type: MemoryType,
    pub scope: MemoryScope,
    pub importance: f64,
    pub tags: Vec<String>,
    pub metadata: Metadata,
    /// Explicit TTL in seconds; falls back to the tier policy when unset.
    pub ttl_secs: Option<i64>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

impl NewMemory {
    pub fn new(content: serde_json::Value, memory_type: MemoryType, scope: MemoryScope) -> Self {
        Self {
            content,
            memory_type,
            scope,
            importance: 0.5,
            tags: Vec::new(),
            metadata: Metadata::new(),
            ttl_secs: None,
            user_id: None,
            session_id: None,
        }
    }

    pub fn importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = Some(ttl_secs);
        self
    }

    pub fn user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }
}

/// Durable summary of a session's accumulated context. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub context: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub intent_history: Vec<IntentType>,
    pub entity_history: EntityMap,
    pub conversation_state: ConversationState,
    pub summary: String,
}
