use crate::errors::ColloquyResult;
use crate::models::{ConversationSession, Intent, Response};

/// External collaborator that produces response text for a classified turn.
pub trait IResponseGenerator: Send + Sync {
    fn generate(&self, intent: &Intent, session: &ConversationSession) -> ColloquyResult<Response>;
}
