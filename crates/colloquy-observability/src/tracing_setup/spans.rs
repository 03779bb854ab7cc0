//! Span definitions per operation: turn, classification, sweep.

/// Create a span covering one processed turn.
#[macro_export]
macro_rules! turn_span {
    ($session_id:expr, $user_id:expr) => {
        tracing::info_span!("colloquy.turn", session_id = %$session_id, user_id = %$user_id)
    };
}

/// Create a classification span.
#[macro_export]
macro_rules! classify_span {
    ($text_len:expr) => {
        tracing::debug_span!("colloquy.classify", text_len = $text_len)
    };
}

/// Create a background sweep span.
#[macro_export]
macro_rules! sweep_span {
    ($sweep:expr) => {
        tracing::info_span!("colloquy.sweep", sweep = %$sweep)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const TURN: &str = "colloquy.turn";
    pub const CLASSIFY: &str = "colloquy.classify";
    pub const SWEEP: &str = "colloquy.sweep";
}
