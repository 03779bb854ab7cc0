pub mod memory_crud;
pub mod memory_query;
pub mod snapshot_ops;

use chrono::{DateTime, SecondsFormat, Utc};

use colloquy_core::errors::{ColloquyResult, StorageError};

/// Fixed-width RFC 3339 so lexical order equals chronological order.
pub(crate) fn fmt_ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(id: &str, raw: &str) -> ColloquyResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::CorruptRow {
                id: id.to_string(),
                details: format!("parse datetime '{raw}': {e}"),
            }
            .into()
        })
}

pub(crate) fn corrupt(id: &str, details: impl Into<String>) -> colloquy_core::ColloquyError {
    StorageError::CorruptRow {
        id: id.to_string(),
        details: details.into(),
    }
    .into()
}
