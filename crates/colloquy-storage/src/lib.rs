//! # colloquy-storage
//!
//! SQLite implementation of [`IMemoryStorage`](colloquy_core::traits::IMemoryStorage):
//! the `memories` and `context_snapshots` tables, schema migrations and
//! connection setup.

pub mod connection;
pub mod engine;
pub mod migrations;
pub mod queries;

pub use engine::StorageEngine;

use colloquy_core::errors::{ColloquyError, StorageError};

/// Map any displayable backend failure into the storage error taxonomy.
pub(crate) fn to_storage_err(message: impl Into<String>) -> ColloquyError {
    ColloquyError::StorageError(StorageError::Sqlite {
        message: message.into(),
    })
}
