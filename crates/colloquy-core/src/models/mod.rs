mod entity;
mod intent;
mod memory;
mod preference;
mod response;
mod session;

pub use entity::{merge_entities, push_entity, EntityMap, EntityType};
pub use intent::{ClassificationContext, ContextFlags, Intent, IntentType};
pub use memory::{
    ContextSnapshot, MemoryItem, MemoryQuery, MemoryScope, MemoryType, NewMemory,
    RetentionPolicy, META_SESSION_ID, META_USER_ID,
};
pub use preference::{
    InteractionPatterns, PersonalizationLevel, PreferenceObservation, PreferenceTable,
    PreferenceType, PreferenceValue, UserPreference, UserProfile,
};
pub use response::{ContentPersonalization, PersonalizationModifiers, Response, TurnResult};
pub use session::{
    ConversationSession, ConversationState, DialogueTurn, Metadata, SessionContext, Speaker,
};
