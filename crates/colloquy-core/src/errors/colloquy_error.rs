use super::{ConfigError, DelegationError, ProfileImportError, StorageError};

/// Top-level error type for the conversational core.
#[derive(Debug, thiserror::Error)]
pub enum ColloquyError {
    #[error("validation failed: {reason}")]
    ValidationError { reason: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("turn for session {session_id} exceeded {timeout_ms}ms")]
    TurnTimeout { session_id: String, timeout_ms: u64 },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("delegation error: {0}")]
    DelegationError(#[from] DelegationError),

    #[error("profile import error: {0}")]
    ProfileImportError(#[from] ProfileImportError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ColloquyError {
    /// Shorthand for a [`ColloquyError::ValidationError`].
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationError {
            reason: reason.into(),
        }
    }

    /// True for failures the runtime degrades around instead of surfacing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ValidationError { .. }
                | Self::StorageError(_)
                | Self::DelegationError(_)
                | Self::TurnTimeout { .. }
        )
    }
}

pub type ColloquyResult<T> = Result<T, ColloquyError>;
