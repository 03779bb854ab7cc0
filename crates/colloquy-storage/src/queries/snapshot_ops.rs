//! Append-only context snapshot persistence.

use rusqlite::{params, Connection};

use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{ContextSnapshot, ConversationState, EntityMap, IntentType};

use super::{corrupt, fmt_ts, parse_ts};
use crate::to_storage_err;

pub fn insert_snapshot(conn: &Connection, snapshot: &ContextSnapshot) -> ColloquyResult<()> {
    let context =
        serde_json::to_string(&snapshot.context).map_err(|e| to_storage_err(e.to_string()))?;
    let intents = serde_json::to_string(&snapshot.intent_history)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let entities = serde_json::to_string(&snapshot.entity_history)
        .map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "INSERT INTO context_snapshots (
            id, user_id, session_id, context, timestamp,
            intent_history, entity_history, state, summary
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            snapshot.id,
            snapshot.user_id,
            snapshot.session_id,
            context,
            fmt_ts(&snapshot.timestamp),
            intents,
            entities,
            snapshot.conversation_state.as_str(),
            snapshot.summary,
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_snapshot: {e}")))?;
    Ok(())
}

/// Snapshots for a user, optionally narrowed to one session, newest first.
pub fn list_snapshots(
    conn: &Connection,
    user_id: &str,
    session_id: Option<&str>,
    limit: usize,
) -> ColloquyResult<Vec<ContextSnapshot>> {
    let sql = "SELECT id, user_id, session_id, context, timestamp,
                      intent_history, entity_history, state, summary
               FROM context_snapshots
               WHERE user_id = ?1 AND (?2 IS NULL OR session_id = ?2)
               ORDER BY timestamp DESC, rowid DESC
               LIMIT ?3";
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(params![user_id, session_id, limit], |row| {
            Ok([
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ])
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut snapshots = Vec::new();
    for row in rows {
        let cols = row.map_err(|e| to_storage_err(e.to_string()))?;
        snapshots.push(decode(cols)?);
    }
    Ok(snapshots)
}

fn decode(cols: [String; 9]) -> ColloquyResult<ContextSnapshot> {
    let [id, user_id, session_id, context, timestamp, intents, entities, state, summary] = cols;
    let context: serde_json::Value =
        serde_json::from_str(&context).map_err(|e| corrupt(&id, format!("parse context: {e}")))?;
    let intent_history: Vec<IntentType> = serde_json::from_str(&intents)
        .map_err(|e| corrupt(&id, format!("parse intent_history: {e}")))?;
    let entity_history: EntityMap = serde_json::from_str(&entities)
        .map_err(|e| corrupt(&id, format!("parse entity_history: {e}")))?;
    let conversation_state = ConversationState::parse(&state)
        .ok_or_else(|| corrupt(&id, format!("unknown state '{state}'")))?;
    let timestamp = parse_ts(&id, &timestamp)?;

    Ok(ContextSnapshot {
        id,
        user_id,
        session_id,
        context,
        timestamp,
        intent_history,
        entity_history,
        conversation_state,
        summary,
    })
}
