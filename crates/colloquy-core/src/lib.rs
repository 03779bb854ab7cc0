//! # colloquy-core
//!
//! Foundation crate for the Colloquy conversational core.
//! Defines the shared types, traits, errors and configuration.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ColloquyConfig;
pub use errors::{ColloquyError, ColloquyResult};
pub use models::{
    ConversationState, EntityMap, EntityType, Intent, IntentType, MemoryItem, MemoryScope,
    MemoryType, PreferenceType, UserProfile,
};
