//! SessionManager: one `tokio::sync::Mutex` per session inside a `DashMap`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};

use colloquy_core::errors::{ColloquyError, ColloquyResult};
use colloquy_core::models::{
    ConversationSession, ConversationState, DialogueTurn, EntityMap, Intent, Response, Speaker,
};

use crate::dialogue::{DialogueEngine, TurnOutcome};

pub(crate) type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Counts and timing for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub user_id: String,
    pub total_turns: usize,
    pub user_turns: usize,
    pub assistant_turns: usize,
    pub state: ConversationState,
    pub entities_collected: EntityMap,
    pub duration_secs: i64,
}

pub struct SessionManager {
    pub(crate) sessions: DashMap<String, SessionHandle>,
    engine: Arc<DialogueEngine>,
    pub(crate) timeout: Duration,
}

impl SessionManager {
    pub fn new(engine: Arc<DialogueEngine>) -> Self {
        let secs = i64::try_from(engine.config().session_timeout_secs).unwrap_or(i64::MAX);
        Self {
            sessions: DashMap::new(),
            timeout: Duration::try_seconds(secs).unwrap_or(Duration::MAX),
            engine,
        }
    }

    pub fn engine(&self) -> &Arc<DialogueEngine> {
        &self.engine
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a session in `Initial` and return its id.
    pub fn create_session(&self, user_id: &str, now: DateTime<Utc>) -> String {
        let session = ConversationSession::new(user_id, now);
        let session_id = session.session_id.clone();
        self.sessions
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));
        tracing::debug!(session_id = %session_id, user_id = %user_id, "session created");
        session_id
    }

    /// Lock a live session for the duration of a turn. Expired sessions are
    /// purged here and reported as not found.
    pub async fn acquire(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> ColloquyResult<OwnedMutexGuard<ConversationSession>> {
        let handle = self
            .sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| not_found(session_id))?;

        let guard = Arc::clone(&handle).lock_owned().await;

        let still_registered = self
            .sessions
            .get(session_id)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), &handle));
        if !still_registered {
            return Err(not_found(session_id));
        }
        if guard.is_expired(now, self.timeout) {
            drop(guard);
            self.sessions
                .remove_if(session_id, |_, h| Arc::ptr_eq(h, &handle));
            tracing::info!(session_id = %session_id, "session expired");
            return Err(not_found(session_id));
        }
        Ok(guard)
    }

    /// Apply a classified turn under the session lock.
    pub async fn process_message(
        &self,
        session_id: &str,
        utterance: &str,
        intent: &Intent,
        response: &Response,
        now: DateTime<Utc>,
    ) -> ColloquyResult<TurnOutcome> {
        let mut session = self.acquire(session_id, now).await?;
        Ok(self
            .engine
            .apply_turn(&mut session, utterance, intent, response, now))
    }

    /// The last `limit` turns in order; `0` returns the whole log.
    pub async fn get_history(
        &self,
        session_id: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> ColloquyResult<Vec<DialogueTurn>> {
        let session = self.acquire(session_id, now).await?;
        let turns = if limit == 0 {
            &session.turn_log[..]
        } else {
            session.recent_turns(limit)
        };
        Ok(turns.to_vec())
    }

    /// Forget a session. Returns false if it was unknown.
    pub fn clear_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id = %session_id, "session cleared");
        }
        removed
    }

    pub fn active_session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }

    pub async fn summary(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> ColloquyResult<SessionSummary> {
        let session = self.acquire(session_id, now).await?;
        let user_turns = session
            .turn_log
            .iter()
            .filter(|t| t.speaker == Speaker::User)
            .count();
        Ok(SessionSummary {
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
            total_turns: session.turn_log.len(),
            user_turns,
            assistant_turns: session.turn_log.len() - user_turns,
            state: session.state,
            entities_collected: session.entities_collected.clone(),
            duration_secs: (now - session.created_at).num_seconds(),
        })
    }
}

fn not_found(session_id: &str) -> ColloquyError {
    ColloquyError::SessionNotFound {
        session_id: session_id.to_string(),
    }
}
