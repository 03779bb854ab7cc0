//! # colloquy-memory
//!
//! Memory & context store: typed memories with per-tier retention, the
//! periodic sweep, context snapshots and historic relevance scoring.

pub mod context;
pub mod manager;
pub mod relevance;
pub mod summary;
pub mod sweep;

pub use context::{ActiveContext, ContextManager, RelevantContext};
pub use manager::{MemoryManager, MemoryStatistics};
pub use sweep::CleanupStats;
