//! # colloquy-intent
//!
//! Deterministic intent classifier: pattern scoring over normalized text,
//! per-type entity extraction over the original text, and context flags.

pub mod classifier;
pub mod context;
pub mod normalize;
pub mod patterns;

pub use classifier::IntentClassifier;
pub use patterns::{MatchTarget, PatternLoader, PatternSet};
