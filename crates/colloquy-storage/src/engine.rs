//! StorageEngine: owns the connection, runs migrations, implements IMemoryStorage.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use colloquy_core::config::StorageConfig;
use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{ContextSnapshot, MemoryItem, MemoryQuery, MemoryType};
use colloquy_core::traits::IMemoryStorage;

use crate::connection::{pragmas, WriteConnection};
use crate::migrations;
use crate::queries::{memory_crud, memory_query, snapshot_ops};

/// SQLite-backed store for memories and context snapshots.
pub struct StorageEngine {
    conn: WriteConnection,
    db_path: Option<PathBuf>,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> ColloquyResult<Self> {
        Self::open_with(path, &StorageConfig::default())
    }

    /// Open using the storage section of the runtime config.
    pub fn from_config(config: &StorageConfig) -> ColloquyResult<Self> {
        Self::open_with(Path::new(&config.db_path), config)
    }

    fn open_with(path: &Path, config: &StorageConfig) -> ColloquyResult<Self> {
        let conn = WriteConnection::open(path, config.busy_timeout_ms)?;
        let engine = Self {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        engine.initialize()?;
        tracing::info!(path = %path.display(), "opened storage");
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> ColloquyResult<Self> {
        let engine = Self {
            conn: WriteConnection::open_in_memory()?,
            db_path: None,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> ColloquyResult<()> {
        self.conn.with_conn(migrations::run_migrations)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn schema_version(&self) -> ColloquyResult<u32> {
        self.conn.with_conn(migrations::current_version)
    }

    /// Whether the connection runs in WAL mode. Always false in memory.
    pub fn is_wal_mode(&self) -> ColloquyResult<bool> {
        self.conn.with_conn(pragmas::verify_wal_mode)
    }
}

impl IMemoryStorage for StorageEngine {
    fn put(&self, item: &MemoryItem) -> ColloquyResult<()> {
        self.conn
            .with_conn(|conn| memory_crud::upsert_memory(conn, item))
    }

    fn get(&self, id: &str) -> ColloquyResult<Option<MemoryItem>> {
        self.conn.with_conn(|conn| memory_crud::get_memory(conn, id))
    }

    fn touch(&self, id: &str, at: DateTime<Utc>) -> ColloquyResult<Option<MemoryItem>> {
        self.conn
            .with_conn(|conn| memory_crud::touch_memory(conn, id, at))
    }

    fn delete(&self, id: &str) -> ColloquyResult<bool> {
        self.conn.with_conn(|conn| memory_crud::delete_memory(conn, id))
    }

    fn delete_bulk(&self, ids: &[String]) -> ColloquyResult<usize> {
        self.conn.with_conn(|conn| memory_crud::delete_bulk(conn, ids))
    }

    fn search(&self, query: &MemoryQuery) -> ColloquyResult<Vec<MemoryItem>> {
        self.conn
            .with_conn(|conn| memory_query::search_memories(conn, query))
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> ColloquyResult<usize> {
        self.conn
            .with_conn(|conn| memory_query::delete_expired(conn, now))
    }

    fn count_by_type(&self) -> ColloquyResult<Vec<(MemoryType, usize)>> {
        self.conn.with_conn(memory_query::count_by_type)
    }

    fn put_snapshot(&self, snapshot: &ContextSnapshot) -> ColloquyResult<()> {
        self.conn
            .with_conn(|conn| snapshot_ops::insert_snapshot(conn, snapshot))
    }

    fn get_snapshots(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        limit: usize,
    ) -> ColloquyResult<Vec<ContextSnapshot>> {
        self.conn
            .with_conn(|conn| snapshot_ops::list_snapshots(conn, user_id, session_id, limit))
    }
}
