//! # colloquy-preference
//!
//! Per-user preference profiles learned from each turn.
//!
//! ## Modules
//!
//! - `extractors` — closed set of per-turn signal extractors
//! - `merge` — weighted-average merge with a capped weight
//! - `decay` — whole-day multiplicative decay and pruning
//! - `tier` — personalization tier from count and confidence
//! - `modifiers` — response-shaping hints
//! - `similarity` — cross-user profile similarity
//! - `insights` — profile summaries and behavioral patterns
//! - `portable` — validated export/import
//! - `engine` — `PreferenceEngine` with one lock per user

pub mod decay;
pub mod engine;
pub mod extractors;
pub mod insights;
pub mod merge;
pub mod modifiers;
pub mod portable;
pub mod similarity;
pub mod tier;

pub use engine::PreferenceEngine;
pub use extractors::Extractor;
pub use insights::UserInsights;
pub use portable::ExportedProfile;
