//! v002: append-only context snapshots.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS context_snapshots (
    id              TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL,
    session_id      TEXT NOT NULL,
    context         TEXT NOT NULL,
    timestamp       TEXT NOT NULL,
    intent_history  TEXT NOT NULL DEFAULT '[]',
    entity_history  TEXT NOT NULL DEFAULT '{}',
    state           TEXT NOT NULL,
    summary         TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_snapshots_user ON context_snapshots(user_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_snapshots_session ON context_snapshots(session_id, timestamp);

CREATE TRIGGER IF NOT EXISTS context_snapshots_immutable
BEFORE UPDATE ON context_snapshots
BEGIN
    SELECT RAISE(ABORT, 'context snapshots are immutable');
END;
";
