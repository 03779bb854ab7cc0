//! One turn drafted against a copy of the session.
//!
//! Nothing here touches shared state: the runtime commits the drafted session
//! only when the whole draft finished inside the turn timeout.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{
    ClassificationContext, ConversationSession, Intent, IntentType, PreferenceObservation,
    Response,
};
use colloquy_core::traits::IResponseGenerator;
use colloquy_intent::IntentClassifier;
use colloquy_observability::classify_span;
use colloquy_preference::PreferenceEngine;
use colloquy_session::{DialogueEngine, TurnOutcome};

pub const FALLBACK_TEXT: &str =
    "I'm having trouble processing that. Could you please rephrase your message?";
pub const FALLBACK_FOLLOW_UPS: [&str; 2] = ["What would you like to discuss?", "How can I help you?"];

/// Product of a successful draft, ready to commit.
#[derive(Debug, Clone)]
pub struct TurnDraft {
    pub session: ConversationSession,
    pub intent: Intent,
    pub response: Response,
    pub outcome: TurnOutcome,
    pub observations: Vec<PreferenceObservation>,
}

pub struct TurnPipeline {
    classifier: IntentClassifier,
    generator: Arc<dyn IResponseGenerator>,
    dialogue: Arc<DialogueEngine>,
    preferences: Arc<PreferenceEngine>,
}

impl TurnPipeline {
    pub fn new(
        classifier: IntentClassifier,
        generator: Arc<dyn IResponseGenerator>,
        dialogue: Arc<DialogueEngine>,
        preferences: Arc<PreferenceEngine>,
    ) -> Self {
        Self {
            classifier,
            generator,
            dialogue,
            preferences,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Classify, generate, transition and extract observations.
    pub fn draft(
        &self,
        mut session: ConversationSession,
        utterance: &str,
        now: DateTime<Utc>,
    ) -> ColloquyResult<TurnDraft> {
        let context = ClassificationContext {
            previous_intent: session.context.last_intent,
            session_length: session.turn_log.len(),
        };
        let intent = {
            let _span = classify_span!(utterance.len()).entered();
            self.classifier.classify(utterance, Some(&context))
        };

        // Low-confidence turns are answered conversationally but keep their
        // classified intent for the state machine.
        let mut response = if self.classifier.is_confident(&intent) {
            self.generator.generate(&intent, &session)?
        } else {
            let conversational = Intent {
                intent_type: IntentType::Conversation,
                ..intent.clone()
            };
            self.generator.generate(&conversational, &session)?
        };

        let outcome = self
            .dialogue
            .apply_turn(&mut session, utterance, &intent, &response, now);
        if let Some(advisory) = &outcome.advisory {
            response
                .metadata
                .insert("advisory".into(), advisory.payload.clone());
            response
                .metadata
                .insert("advisor".into(), serde_json::json!(advisory.advisor));
        }
        if outcome.advisor_failed {
            response
                .metadata
                .insert("advisor_failed".into(), serde_json::json!(true));
        }

        let observations = self.preferences.extract_observations(utterance, &intent);
        tracing::debug!(
            session_id = %session.session_id,
            intent = %intent.intent_type,
            confidence = intent.confidence,
            state = %outcome.state,
            observations = observations.len(),
            "turn drafted"
        );

        Ok(TurnDraft {
            session,
            intent,
            response,
            outcome,
            observations,
        })
    }
}

/// The guaranteed response returned when a turn cannot complete.
pub fn fallback_response() -> Response {
    let mut metadata = colloquy_core::models::Metadata::new();
    metadata.insert("strategy".into(), serde_json::json!("fallback"));
    Response {
        text: FALLBACK_TEXT.to_string(),
        confidence: 0.0,
        intent_type: IntentType::Unknown,
        follow_up_questions: FALLBACK_FOLLOW_UPS.map(String::from).to_vec(),
        metadata,
    }
}
