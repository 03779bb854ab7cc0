use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::errors::ColloquyResult;
use crate::models::{ContextSnapshot, MemoryItem, MemoryQuery, MemoryType};

/// Generic keyed store for memories and context snapshots.
pub trait IMemoryStorage: Send + Sync {
    // --- Memories ---
    /// Insert or replace by id.
    fn put(&self, item: &MemoryItem) -> ColloquyResult<()>;
    fn get(&self, id: &str) -> ColloquyResult<Option<MemoryItem>>;
    /// Atomically bump `access_count` and `last_accessed_at`, returning the updated item.
    fn touch(&self, id: &str, at: DateTime<Utc>) -> ColloquyResult<Option<MemoryItem>>;
    fn delete(&self, id: &str) -> ColloquyResult<bool>;
    fn delete_bulk(&self, ids: &[String]) -> ColloquyResult<usize>;
    /// Matching items, newest first.
    fn search(&self, query: &MemoryQuery) -> ColloquyResult<Vec<MemoryItem>>;
    /// Remove every item whose `expires_at` is before `now`.
    fn delete_expired(&self, now: DateTime<Utc>) -> ColloquyResult<usize>;
    fn count_by_type(&self) -> ColloquyResult<Vec<(MemoryType, usize)>>;

    // --- Snapshots ---
    /// Append-only: an existing id is never overwritten.
    fn put_snapshot(&self, snapshot: &ContextSnapshot) -> ColloquyResult<()>;
    /// Snapshots for a user (optionally one session), newest first.
    fn get_snapshots(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        limit: usize,
    ) -> ColloquyResult<Vec<ContextSnapshot>>;
}

impl<T: IMemoryStorage> IMemoryStorage for Arc<T> {
    fn put(&self, item: &MemoryItem) -> ColloquyResult<()> {
        (**self).put(item)
    }
    fn get(&self, id: &str) -> ColloquyResult<Option<MemoryItem>> {
        (**self).get(id)
    }
    fn touch(&self, id: &str, at: DateTime<Utc>) -> ColloquyResult<Option<MemoryItem>> {
        (**self).touch(id, at)
    }
    fn delete(&self, id: &str) -> ColloquyResult<bool> {
        (**self).delete(id)
    }
    fn delete_bulk(&self, ids: &[String]) -> ColloquyResult<usize> {
        (**self).delete_bulk(ids)
    }
    fn search(&self, query: &MemoryQuery) -> ColloquyResult<Vec<MemoryItem>> {
        (**self).search(query)
    }
    fn delete_expired(&self, now: DateTime<Utc>) -> ColloquyResult<usize> {
        (**self).delete_expired(now)
    }
    fn count_by_type(&self) -> ColloquyResult<Vec<(MemoryType, usize)>> {
        (**self).count_by_type()
    }
    fn put_snapshot(&self, snapshot: &ContextSnapshot) -> ColloquyResult<()> {
        (**self).put_snapshot(snapshot)
    }
    fn get_snapshots(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        limit: usize,
    ) -> ColloquyResult<Vec<ContextSnapshot>> {
        (**self).get_snapshots(user_id, session_id, limit)
    }
}
