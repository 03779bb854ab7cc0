use crate::errors::DelegationError;
use crate::models::{DialogueTurn, EntityMap, IntentType};

/// Everything an advisor gets to see about the turn.
#[derive(Debug, Clone, Copy)]
pub struct AdvisorRequest<'a> {
    pub utterance: &'a str,
    pub entities: &'a EntityMap,
    /// Bounded recent history, oldest first.
    pub history: &'a [DialogueTurn],
}

/// A specialized sub-conversation handler keyed by intent type.
pub trait IDomainAdvisor: Send + Sync {
    fn name(&self) -> &str;
    fn intent_type(&self) -> IntentType;
    /// Free-form advisory payload merged into turn metadata.
    fn advise(&self, request: &AdvisorRequest<'_>) -> Result<serde_json::Value, DelegationError>;
}
