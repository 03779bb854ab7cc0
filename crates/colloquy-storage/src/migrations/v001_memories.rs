//! v001: memories table with type, scope and expiry indexes.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS memories (
    id            TEXT PRIMARY KEY,
    memory_type   TEXT NOT NULL,
    scope         TEXT NOT NULL,
    content       TEXT NOT NULL,
    timestamp     TEXT NOT NULL,
    expiration    TEXT,
    access_count  INTEGER NOT NULL DEFAULT 0,
    last_accessed TEXT,
    importance    REAL NOT NULL DEFAULT 0.5,
    tags          TEXT NOT NULL DEFAULT '[]',
    metadata      TEXT NOT NULL DEFAULT '{}',
    CHECK (expiration IS NULL OR expiration >= timestamp)
);

CREATE INDEX IF NOT EXISTS idx_memories_type ON memories(memory_type);
CREATE INDEX IF NOT EXISTS idx_memories_scope ON memories(scope);
CREATE INDEX IF NOT EXISTS idx_memories_timestamp ON memories(timestamp);
CREATE INDEX IF NOT EXISTS idx_memories_expiration ON memories(expiration);
CREATE INDEX IF NOT EXISTS idx_memories_user
    ON memories(json_extract(metadata, '$.user_id'));
CREATE INDEX IF NOT EXISTS idx_memories_session
    ON memories(json_extract(metadata, '$.session_id'));
";
