//! Insert, get, touch, delete and bulk ops for memories.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{MemoryItem, MemoryScope, MemoryType, Metadata};

use super::{corrupt, fmt_ts, parse_ts};
use crate::to_storage_err;

pub(crate) const MEMORY_COLUMNS: &str = "id, memory_type, scope, content, timestamp, expiration, \
     access_count, last_accessed, importance, tags, metadata";

/// Insert or replace a memory by id.
pub fn upsert_memory(conn: &Connection, item: &MemoryItem) -> ColloquyResult<()> {
    let content = serde_json::to_string(&item.content).map_err(|e| to_storage_err(e.to_string()))?;
    let tags = serde_json::to_string(&item.tags).map_err(|e| to_storage_err(e.to_string()))?;
    let metadata =
        serde_json::to_string(&item.metadata).map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "INSERT OR REPLACE INTO memories (
            id, memory_type, scope, content, timestamp, expiration,
            access_count, last_accessed, importance, tags, metadata
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            item.id,
            item.memory_type.as_str(),
            item.scope.as_str(),
            content,
            fmt_ts(&item.created_at),
            item.expires_at.as_ref().map(fmt_ts),
            item.access_count as i64,
            item.last_accessed_at.as_ref().map(fmt_ts),
            item.importance,
            tags,
            metadata,
        ],
    )
    .map_err(|e| to_storage_err(format!("upsert_memory: {e}")))?;
    Ok(())
}

pub fn get_memory(conn: &Connection, id: &str) -> ColloquyResult<Option<MemoryItem>> {
    let sql = format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1");
    let raw = conn
        .query_row(&sql, params![id], RawMemoryRow::from_row)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawMemoryRow::into_item).transpose()
}

/// Bump the access counters and return the updated row, atomically.
pub fn touch_memory(
    conn: &Connection,
    id: &str,
    at: DateTime<Utc>,
) -> ColloquyResult<Option<MemoryItem>> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("touch_memory begin: {e}")))?;

    let changed = tx
        .execute(
            "UPDATE memories SET access_count = access_count + 1, last_accessed = ?2 WHERE id = ?1",
            params![id, fmt_ts(&at)],
        )
        .map_err(|e| to_storage_err(e.to_string()));

    let result = match changed {
        Ok(0) => Ok(None),
        Ok(_) => get_memory(&tx, id),
        Err(e) => Err(e),
    };

    match result {
        Ok(item) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("touch_memory commit: {e}")))?;
            Ok(item)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

pub fn delete_memory(conn: &Connection, id: &str) -> ColloquyResult<bool> {
    let changed = conn
        .execute("DELETE FROM memories WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed > 0)
}

/// Delete many ids in one transaction. Returns the number actually removed.
pub fn delete_bulk(conn: &Connection, ids: &[String]) -> ColloquyResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("delete_bulk begin: {e}")))?;

    let mut removed = 0;
    {
        let mut stmt = tx
            .prepare_cached("DELETE FROM memories WHERE id = ?1")
            .map_err(|e| to_storage_err(e.to_string()))?;
        for id in ids {
            match stmt.execute(params![id]) {
                Ok(n) => removed += n,
                Err(e) => {
                    drop(stmt);
                    let _ = tx.rollback();
                    return Err(to_storage_err(format!("delete_bulk: {e}")));
                }
            }
        }
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("delete_bulk commit: {e}")))?;
    Ok(removed)
}

/// Column values as stored, before JSON and enum decoding.
pub(crate) struct RawMemoryRow {
    id: String,
    memory_type: String,
    scope: String,
    content: String,
    timestamp: String,
    expiration: Option<String>,
    access_count: i64,
    last_accessed: Option<String>,
    importance: f64,
    tags: String,
    metadata: String,
}

impl RawMemoryRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            memory_type: row.get(1)?,
            scope: row.get(2)?,
            content: row.get(3)?,
            timestamp: row.get(4)?,
            expiration: row.get(5)?,
            access_count: row.get(6)?,
            last_accessed: row.get(7)?,
            importance: row.get(8)?,
            tags: row.get(9)?,
            metadata: row.get(10)?,
        })
    }

    pub(crate) fn into_item(self) -> ColloquyResult<MemoryItem> {
        let id = self.id;
        let memory_type = MemoryType::parse(&self.memory_type)
            .ok_or_else(|| corrupt(&id, format!("unknown memory type '{}'", self.memory_type)))?;
        let scope = MemoryScope::parse(&self.scope)
            .ok_or_else(|| corrupt(&id, format!("unknown scope '{}'", self.scope)))?;
        let content: serde_json::Value = serde_json::from_str(&self.content)
            .map_err(|e| corrupt(&id, format!("parse content: {e}")))?;
        let tags: BTreeSet<String> = serde_json::from_str(&self.tags)
            .map_err(|e| corrupt(&id, format!("parse tags: {e}")))?;
        let metadata: Metadata = serde_json::from_str(&self.metadata)
            .map_err(|e| corrupt(&id, format!("parse metadata: {e}")))?;

        Ok(MemoryItem {
            created_at: parse_ts(&id, &self.timestamp)?,
            expires_at: self
                .expiration
                .as_deref()
                .map(|raw| parse_ts(&id, raw))
                .transpose()?,
            last_accessed_at: self
                .last_accessed
                .as_deref()
                .map(|raw| parse_ts(&id, raw))
                .transpose()?,
            access_count: u64::try_from(self.access_count).unwrap_or(0),
            importance: self.importance,
            memory_type,
            scope,
            content,
            tags,
            metadata,
            id,
        })
    }
}
