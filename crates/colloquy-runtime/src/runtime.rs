//! ColloquyRuntime: owns every engine and exposes the conversation operations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use tracing::Instrument;

use colloquy_core::config::ColloquyConfig;
use colloquy_core::errors::{ColloquyError, ColloquyResult};
use colloquy_core::models::{
    ConversationSession, DialogueTurn, PersonalizationModifiers, TurnResult, UserProfile,
};
use colloquy_core::traits::{IMemoryStorage, IResponseGenerator};
use colloquy_intent::IntentClassifier;
use colloquy_memory::{CleanupStats, ContextManager, MemoryManager, RelevantContext};
use colloquy_observability::tracing_setup::events;
use colloquy_observability::{turn_span, DegradationEvent, DegradationTracker, TrackedDegradation};
use colloquy_preference::decay::DecayStats;
use colloquy_preference::{PreferenceEngine, UserInsights};
use colloquy_session::{DialogueEngine, SessionManager, SessionSummary};
use colloquy_storage::StorageEngine;

use crate::advisors::{ProductAdvisor, SportsAdvisor};
use crate::pipeline::{fallback_response, TurnDraft, TurnPipeline};
use crate::responses::TemplateResponseGenerator;

const PIPELINE_COMPONENT: &str = "turn_pipeline";
const FALLBACK_NAME: &str = "fallback_response";

/// How a turn failed to produce a draft.
enum TurnFailure {
    Timeout,
    Error(ColloquyError),
    Panicked(String),
}

impl TurnFailure {
    fn describe(&self, session_id: &str, timeout_ms: u64) -> String {
        match self {
            Self::Timeout => ColloquyError::TurnTimeout {
                session_id: session_id.to_string(),
                timeout_ms,
            }
            .to_string(),
            Self::Error(e) => e.to_string(),
            Self::Panicked(reason) => format!("turn task panicked: {reason}"),
        }
    }
}

pub struct ColloquyRuntime {
    config: ColloquyConfig,
    memory: MemoryManager,
    sessions: Arc<SessionManager>,
    context: Arc<ContextManager>,
    preferences: Arc<PreferenceEngine>,
    pipeline: Arc<TurnPipeline>,
    degradations: Mutex<DegradationTracker>,
}

impl ColloquyRuntime {
    /// Build a runtime over `storage` with the built-in responses and advisors.
    pub fn new(config: ColloquyConfig, storage: Arc<dyn IMemoryStorage>) -> ColloquyResult<Self> {
        Self::with_generator(config, storage, Arc::new(TemplateResponseGenerator))
    }

    /// Open the SQLite store named by `config.storage`.
    pub fn open(config: ColloquyConfig) -> ColloquyResult<Self> {
        let storage = StorageEngine::from_config(&config.storage)?;
        Self::new(config, Arc::new(storage))
    }

    pub fn with_generator(
        config: ColloquyConfig,
        storage: Arc<dyn IMemoryStorage>,
        generator: Arc<dyn IResponseGenerator>,
    ) -> ColloquyResult<Self> {
        let classifier = IntentClassifier::from_config(config.classifier.clone())?;
        let dialogue = Arc::new(
            DialogueEngine::new(config.dialogue.clone())
                .with_advisor(Arc::new(SportsAdvisor))
                .with_advisor(Arc::new(ProductAdvisor)),
        );
        let memory = MemoryManager::new(storage, config.memory.clone());
        let preferences = Arc::new(PreferenceEngine::with_memory(
            config.preference.clone(),
            memory.clone(),
        ));
        let pipeline = Arc::new(TurnPipeline::new(
            classifier,
            generator,
            Arc::clone(&dialogue),
            Arc::clone(&preferences),
        ));

        tracing::info!(
            advisors = ?dialogue.advisor_names(),
            turn_timeout_ms = config.runtime.turn_timeout_ms,
            "runtime initialized"
        );

        Ok(Self {
            sessions: Arc::new(SessionManager::new(dialogue)),
            context: Arc::new(ContextManager::new(memory.clone())),
            memory,
            preferences,
            pipeline,
            degradations: Mutex::new(DegradationTracker::new()),
            config,
        })
    }

    pub fn config(&self) -> &ColloquyConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn preferences(&self) -> &Arc<PreferenceEngine> {
        &self.preferences
    }

    pub fn context(&self) -> &Arc<ContextManager> {
        &self.context
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    // ── sessions ──

    pub fn create_session(&self, user_id: &str) -> String {
        let now = Utc::now();
        let session_id = self.sessions.create_session(user_id, now);
        self.preferences.record_session(user_id, now);
        events::session_created(&session_id, user_id);
        session_id
    }

    /// Run one turn. Only an unknown or expired session is surfaced as an
    /// error; any other failure yields the fallback response with the session
    /// and profile left as they were.
    pub async fn process_turn(
        &self,
        session_id: &str,
        utterance: &str,
    ) -> ColloquyResult<TurnResult> {
        let now = Utc::now();
        let guard = self.sessions.acquire(session_id, now).await?;
        let span = turn_span!(session_id, guard.user_id);
        self.run_turn(guard, utterance, now).instrument(span).await
    }

    async fn run_turn(
        &self,
        mut guard: tokio::sync::OwnedMutexGuard<ConversationSession>,
        utterance: &str,
        now: DateTime<Utc>,
    ) -> ColloquyResult<TurnResult> {
        let started = Instant::now();
        let timeout_ms = self.config.runtime.turn_timeout_ms;
        let pipeline = Arc::clone(&self.pipeline);
        let draft_copy = guard.clone();
        let text = utterance.to_string();

        let task = tokio::task::spawn_blocking(move || pipeline.draft(draft_copy, &text, now));
        let drafted = match tokio::time::timeout(StdDuration::from_millis(timeout_ms), task).await {
            Ok(Ok(Ok(draft))) => Ok(draft),
            Ok(Ok(Err(e))) => Err(TurnFailure::Error(e)),
            Ok(Err(join)) => Err(TurnFailure::Panicked(join.to_string())),
            Err(_) => Err(TurnFailure::Timeout),
        };

        let draft = match drafted {
            Ok(draft) => draft,
            Err(failure) => {
                let result = self.degraded_turn(&guard, &failure, timeout_ms, now);
                return Ok(result);
            }
        };

        *guard = draft.session.clone();
        let user_id = guard.user_id.clone();
        let session_id = guard.session_id.clone();

        self.commit_side_effects(&user_id, &session_id, &draft, now).await;
        drop(guard);
        lock(&self.degradations).mark_recovered(PIPELINE_COMPONENT, now);

        events::turn_processed(
            &session_id,
            draft.intent.intent_type.as_str(),
            draft.outcome.state.as_str(),
            started.elapsed().as_millis(),
        );

        Ok(TurnResult {
            session_id,
            state: draft.outcome.state,
            response: draft.response,
            follow_up_questions: draft.outcome.follow_up_questions,
            entities_collected: draft.session.entities_collected,
            personalization_modifiers: self.preferences.get_modifiers(&user_id),
            degraded: false,
        })
    }

    /// Profile merge and best-effort context writes for a committed turn.
    async fn commit_side_effects(
        &self,
        user_id: &str,
        session_id: &str,
        draft: &TurnDraft,
        now: DateTime<Utc>,
    ) {
        let preferences = Arc::clone(&self.preferences);
        let context = Arc::clone(&self.context);
        let user = user_id.to_string();
        let session = session_id.to_string();
        let flags = draft.intent.flags.clone();
        let observations = draft.observations.clone();
        let intent_type = draft.intent.intent_type;
        let entities = draft.intent.entities.clone();
        let state = draft.outcome.state;
        let session_context = session_context_map(&draft.session);

        let task = tokio::task::spawn_blocking(move || {
            preferences.apply_observations(&user, &flags, &observations, now);
            context.update_context(
                &session,
                &user,
                &session_context,
                intent_type,
                &entities,
                state,
                now,
            )
        });

        match task.await {
            Ok(Ok(Some(snapshot))) => {
                events::snapshot_written(&snapshot.id, session_id, state.as_str());
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                tracing::warn!(session_id = %session_id, error = %e, "context update failed");
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "turn commit task failed");
            }
        }
    }

    fn degraded_turn(
        &self,
        session: &ConversationSession,
        failure: &TurnFailure,
        timeout_ms: u64,
        now: DateTime<Utc>,
    ) -> TurnResult {
        let reason = failure.describe(&session.session_id, timeout_ms);
        let response = fallback_response();
        lock(&self.degradations).record(DegradationEvent {
            component: PIPELINE_COMPONENT.to_string(),
            failure: reason,
            fallback_used: FALLBACK_NAME.to_string(),
            timestamp: now,
        });
        TurnResult {
            session_id: session.session_id.clone(),
            state: session.state,
            follow_up_questions: response.follow_up_questions.clone(),
            response,
            entities_collected: session.entities_collected.clone(),
            personalization_modifiers: self.preferences.get_modifiers(&session.user_id),
            degraded: true,
        }
    }

    /// The last `limit` turns in order; `0` returns the whole log.
    pub async fn get_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> ColloquyResult<Vec<DialogueTurn>> {
        self.sessions.get_history(session_id, limit, Utc::now()).await
    }

    pub async fn session_summary(&self, session_id: &str) -> ColloquyResult<SessionSummary> {
        self.sessions.summary(session_id, Utc::now()).await
    }

    /// Forget the session and its live context. Snapshots are kept.
    pub fn clear_session(&self, session_id: &str) -> bool {
        let existed = self.sessions.clear_session(session_id);
        if let Err(e) = self.context.clear_session_context(session_id) {
            tracing::warn!(session_id = %session_id, error = %e, "failed to clear session context");
        }
        existed
    }

    /// Past snapshots for the user ranked against `current`.
    pub fn relevant_context(
        &self,
        user_id: &str,
        current: &Value,
    ) -> ColloquyResult<Vec<RelevantContext>> {
        self.context.get_relevant_context(user_id, current)
    }

    // ── preferences ──

    pub fn get_user_insights(&self, user_id: &str) -> Option<UserInsights> {
        self.preferences.get_user_insights(user_id)
    }

    pub fn get_modifiers(&self, user_id: &str) -> PersonalizationModifiers {
        self.preferences.get_modifiers(user_id)
    }

    pub fn get_similar_users(&self, user_id: &str, limit: usize) -> Vec<(String, f64)> {
        self.preferences.get_similar_users(user_id, limit)
    }

    /// Portable JSON form of the user's profile, `None` if unknown.
    pub fn export_profile(&self, user_id: &str) -> ColloquyResult<Option<Value>> {
        self.preferences
            .export_profile(user_id)
            .map(|exported| serde_json::to_value(exported).map_err(ColloquyError::from))
            .transpose()
    }

    /// Replace a profile from its exported form. The live profile is
    /// untouched unless the whole payload validates.
    pub fn import_profile(&self, data: &Value) -> ColloquyResult<UserProfile> {
        let profile = self.preferences.import_profile(data, Utc::now())?;
        events::profile_imported(&profile.user_id, profile.preference_count());
        Ok(profile)
    }

    // ── sweeps ──

    pub fn sweep_memories(&self, now: DateTime<Utc>) -> ColloquyResult<CleanupStats> {
        let stats = self.memory.cleanup_memories(now)?;
        events::memory_swept(stats.expired, stats.low_importance, stats.over_limit);
        Ok(stats)
    }

    pub fn sweep_sessions(&self, now: DateTime<Utc>) -> usize {
        self.sessions.cleanup_expired_sessions(now)
    }

    pub fn sweep_decay(&self, now: DateTime<Utc>) -> DecayStats {
        self.preferences.apply_decay_all(now)
    }

    pub fn sweep_contexts(&self, now: DateTime<Utc>) -> usize {
        let hours = i64::try_from(self.config.memory.inactive_context_hours).unwrap_or(i64::MAX);
        let max_age = Duration::try_hours(hours).unwrap_or(Duration::MAX);
        self.context.cleanup_inactive_contexts(max_age, now)
    }

    // ── degradation ──

    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        lock(&self.degradations).events().cloned().collect()
    }

    pub fn active_degradation_count(&self) -> usize {
        lock(&self.degradations).active_degradations().len()
    }
}

fn lock(tracker: &Mutex<DegradationTracker>) -> MutexGuard<'_, DegradationTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

fn session_context_map(session: &ConversationSession) -> Map<String, Value> {
    match serde_json::to_value(&session.context) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
