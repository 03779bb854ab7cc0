//! Structured log events for key system operations.

pub fn session_created(session_id: &str, user_id: &str) {
    tracing::info!(
        event = "session_created",
        session_id = %session_id,
        user_id = %user_id,
        "session created"
    );
}

/// Log a completed turn.
pub fn turn_processed(session_id: &str, intent: &str, state: &str, elapsed_ms: u128) {
    tracing::info!(
        event = "turn_processed",
        session_id = %session_id,
        intent = %intent,
        state = %state,
        elapsed_ms = elapsed_ms as u64,
        "turn processed"
    );
}

pub fn memory_swept(expired: usize, low_importance: usize, over_limit: usize) {
    tracing::info!(
        event = "memory_swept",
        expired = expired,
        low_importance = low_importance,
        over_limit = over_limit,
        "memory sweep completed"
    );
}

pub fn snapshot_written(snapshot_id: &str, session_id: &str, state: &str) {
    tracing::debug!(
        event = "snapshot_written",
        snapshot_id = %snapshot_id,
        session_id = %session_id,
        state = %state,
        "context snapshot written"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn profile_imported(user_id: &str, preferences: usize) {
    tracing::info!(
        event = "profile_imported",
        user_id = %user_id,
        preferences = preferences,
        "profile imported"
    );
}
