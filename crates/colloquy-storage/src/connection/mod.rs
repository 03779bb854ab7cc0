//! Single SQLite connection behind a `std::sync::Mutex`.
//! Writes are serialized; callers in async code wrap access in `spawn_blocking`.

pub mod pragmas;

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::Connection;

use colloquy_core::errors::ColloquyResult;

use crate::to_storage_err;
use pragmas::apply_pragmas;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a connection to the given database path.
    pub fn open(path: &Path, busy_timeout_ms: u32) -> ColloquyResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> ColloquyResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, colloquy_core::config::defaults::DEFAULT_BUSY_TIMEOUT_MS)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the lock and execute a closure with the connection. A lock
    /// poisoned by a panicking closure is recovered.
    pub fn with_conn<F, T>(&self, f: F) -> ColloquyResult<T>
    where
        F: FnOnce(&Connection) -> ColloquyResult<T>,
    {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}
