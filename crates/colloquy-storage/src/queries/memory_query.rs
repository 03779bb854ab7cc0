//! Filtered search, expiry deletion and per-type aggregation.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};

use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{MemoryItem, MemoryQuery, MemoryType};

use super::fmt_ts;
use super::memory_crud::{RawMemoryRow, MEMORY_COLUMNS};
use crate::to_storage_err;

/// Memories matching every set filter field, newest first.
pub fn search_memories(conn: &Connection, query: &MemoryQuery) -> ColloquyResult<Vec<MemoryItem>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(memory_type) = query.memory_type {
        clauses.push("memory_type = ?");
        values.push(memory_type.as_str().to_string());
    }
    if let Some(scope) = query.scope {
        clauses.push("scope = ?");
        values.push(scope.as_str().to_string());
    }
    if let Some(user_id) = &query.user_id {
        clauses.push("json_extract(metadata, '$.user_id') = ?");
        values.push(user_id.clone());
    }
    if let Some(session_id) = &query.session_id {
        clauses.push("json_extract(metadata, '$.session_id') = ?");
        values.push(session_id.clone());
    }
    for tag in &query.tags {
        clauses.push("EXISTS (SELECT 1 FROM json_each(memories.tags) WHERE json_each.value = ?)");
        values.push(tag.clone());
    }

    let mut sql = format!("SELECT {MEMORY_COLUMNS} FROM memories");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY timestamp DESC, id ASC");
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(format!("search_memories prepare: {e}")))?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), RawMemoryRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut items = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        items.push(raw.into_item()?);
    }
    Ok(items)
}

/// Delete every memory whose expiration lies before `now`.
pub fn delete_expired(conn: &Connection, now: DateTime<Utc>) -> ColloquyResult<usize> {
    conn.execute(
        "DELETE FROM memories WHERE expiration IS NOT NULL AND expiration < ?1",
        params![fmt_ts(&now)],
    )
    .map_err(|e| to_storage_err(format!("delete_expired: {e}")))
}

pub fn count_by_type(conn: &Connection) -> ColloquyResult<Vec<(MemoryType, usize)>> {
    let mut stmt = conn
        .prepare("SELECT memory_type, COUNT(*) FROM memories GROUP BY memory_type")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut counts = Vec::new();
    for row in rows {
        let (name, count) = row.map_err(|e| to_storage_err(e.to_string()))?;
        match MemoryType::parse(&name) {
            Some(memory_type) => counts.push((memory_type, count.max(0) as usize)),
            None => tracing::warn!(memory_type = %name, "ignoring rows with unknown memory type"),
        }
    }
    Ok(counts)
}
