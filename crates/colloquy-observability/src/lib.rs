//! # colloquy-observability
//!
//! Structured tracing with span definitions and event helpers, plus
//! degradation tracking for turns that fell back to the guaranteed response.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::{DegradationEvent, DegradationTracker, RecoveryStatus, TrackedDegradation};
