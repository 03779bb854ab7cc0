//! DialogueEngine: applies one classified turn to a session.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use colloquy_core::config::DialogueConfig;
use colloquy_core::models::{
    ConversationSession, ConversationState, DialogueTurn, Intent, IntentType, Metadata, Response,
    Speaker,
};
use colloquy_core::traits::{AdvisorRequest, IDomainAdvisor};

use crate::follow_ups::generate_follow_ups;
use crate::selector::{FollowUpSelector, FollowUpSignals};
use crate::transitions::{transition, TransitionContext};

/// Payload returned by the advisor registered for the turn's intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub advisor: String,
    pub payload: serde_json::Value,
}

/// What one turn did to the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub previous_state: ConversationState,
    pub state: ConversationState,
    pub follow_up_questions: Vec<String>,
    pub best_follow_up: String,
    pub new_entities: usize,
    pub advisory: Option<Advisory>,
    /// The registered advisor failed; its payload was dropped.
    pub advisor_failed: bool,
}

/// Stateless turn logic plus the advisor registry.
pub struct DialogueEngine {
    config: DialogueConfig,
    advisors: BTreeMap<IntentType, Arc<dyn IDomainAdvisor>>,
    selector: FollowUpSelector,
}

impl DialogueEngine {
    pub fn new(config: DialogueConfig) -> Self {
        Self {
            config,
            advisors: BTreeMap::new(),
            selector: FollowUpSelector,
        }
    }

    /// Register an advisor for its intent type, replacing any previous one.
    pub fn with_advisor(mut self, advisor: Arc<dyn IDomainAdvisor>) -> Self {
        self.advisors.insert(advisor.intent_type(), advisor);
        self
    }

    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    pub fn advisor_names(&self) -> Vec<&str> {
        self.advisors.values().map(|a| a.name()).collect()
    }

    /// Append both turns, merge entities, refresh context, transition, pick
    /// follow-ups and consult the advisor for this intent. Never fails.
    pub fn apply_turn(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        intent: &Intent,
        response: &Response,
        now: DateTime<Utc>,
    ) -> TurnOutcome {
        let previous_state = session.state;

        let mut user_turn = DialogueTurn::user(utterance, intent.clone(), now);
        if let Ok(entities) = serde_json::to_value(&intent.entities) {
            user_turn.metadata.insert("entities".into(), entities);
        }
        let mut assistant_meta = Metadata::new();
        assistant_meta.insert(
            "follow_up_questions".into(),
            serde_json::json!(response.follow_up_questions),
        );
        session.turn_log.push(user_turn);
        session
            .turn_log
            .push(DialogueTurn::assistant(&response.text, now, assistant_meta));

        let new_entities = session.merge_entities(&intent.entities);
        self.refresh_context(session, intent, response);

        let ctx = TransitionContext {
            is_follow_up: intent.flags.is_follow_up,
            turn_count: session.turn_log.len(),
        };
        let next = transition(
            previous_state,
            intent.intent_type,
            &ctx,
            self.config.gathering_turn_limit,
        );
        session.state = next;

        let follow_up_questions = generate_follow_ups(
            next,
            intent.intent_type,
            &session.entities_collected,
            self.config.max_follow_ups,
        );
        let best_follow_up = self.selector.select_best(
            &follow_up_questions,
            &FollowUpSignals {
                entity_count: session.entities_collected.len(),
                conversation_depth: session.context.conversation_depth,
                has_question_mark: session.context.has_question_mark,
                is_follow_up: session.context.is_follow_up,
            },
        );
        session.follow_up_queue = follow_up_questions.clone();
        session.metadata.insert(
            "session_length".into(),
            serde_json::json!(session.turn_log.len()),
        );
        session.last_activity_at = now;

        let (advisory, advisor_failed) = self.consult_advisor(session, utterance, intent);
        if let (Some(advisory), Some(turn)) = (&advisory, session.turn_log.last_mut()) {
            turn.metadata
                .insert("advisory".into(), advisory.payload.clone());
        }

        if next != previous_state {
            tracing::debug!(
                session_id = %session.session_id,
                from = %previous_state,
                to = %next,
                "state transition"
            );
        }

        TurnOutcome {
            previous_state,
            state: next,
            follow_up_questions,
            best_follow_up,
            new_entities,
            advisory,
            advisor_failed,
        }
    }

    fn refresh_context(&self, session: &mut ConversationSession, intent: &Intent, response: &Response) {
        let user_turns = session
            .turn_log
            .iter()
            .filter(|t| t.speaker == Speaker::User)
            .count();
        let ctx = &mut session.context;
        ctx.last_intent = Some(intent.intent_type);
        ctx.last_intent_confidence = intent.confidence;
        ctx.message_count = user_turns;
        ctx.conversation_depth = user_turns;
        ctx.is_follow_up = intent.flags.is_follow_up;
        ctx.has_question_mark = intent.flags.has_question_mark;
        ctx.last_response_strategy = response
            .metadata
            .get("strategy")
            .and_then(|v| v.as_str())
            .map(str::to_string);
    }

    fn consult_advisor(
        &self,
        session: &ConversationSession,
        utterance: &str,
        intent: &Intent,
    ) -> (Option<Advisory>, bool) {
        let Some(advisor) = self.advisors.get(&intent.intent_type) else {
            return (None, false);
        };
        let request = AdvisorRequest {
            utterance,
            entities: &intent.entities,
            history: session.recent_turns(self.config.advisor_history),
        };
        match advisor.advise(&request) {
            Ok(payload) => (
                Some(Advisory {
                    advisor: advisor.name().to_string(),
                    payload,
                }),
                false,
            ),
            Err(e) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    advisor = advisor.name(),
                    error = %e,
                    "advisor failed, continuing without it"
                );
                (None, true)
            }
        }
    }
}

impl Default for DialogueEngine {
    fn default() -> Self {
        Self::new(DialogueConfig::default())
    }
}
