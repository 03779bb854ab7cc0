//! PreferenceEngine: per-user profiles behind one lock each.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use colloquy_core::config::PreferenceConfig;
use colloquy_core::errors::{ColloquyResult, ProfileImportError};
use colloquy_core::models::{
    ContextFlags, Intent, MemoryItem, MemoryScope, MemoryType, Metadata,
    PersonalizationModifiers, PreferenceObservation, UserPreference, UserProfile, META_USER_ID,
};
use colloquy_memory::MemoryManager;

use crate::decay::{self, DecayStats};
use crate::extractors;
use crate::insights::UserInsights;
use crate::merge::merge_observation;
use crate::modifiers::modifiers_for;
use crate::portable::ExportedProfile;
use crate::similarity::profile_similarity;
use crate::tier;

const PROFILE_IMPORTANCE: f64 = 0.9;

fn profile_memory_id(user_id: &str) -> String {
    format!("profile:{user_id}")
}

fn lock(profile: &Mutex<UserProfile>) -> MutexGuard<'_, UserProfile> {
    profile.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Learns and serves per-user preference profiles.
///
/// Updates for one user are serialized by that user's mutex, held for the
/// synchronous merge/decay commit. With a [`MemoryManager`] attached each
/// committed profile is persisted best-effort before the mutex is released,
/// so stored snapshots follow commit order. Profiles are reloaded on first use.
pub struct PreferenceEngine {
    config: PreferenceConfig,
    profiles: DashMap<String, Arc<Mutex<UserProfile>>>,
    memory: Option<MemoryManager>,
}

impl PreferenceEngine {
    pub fn new(config: PreferenceConfig) -> Self {
        Self {
            config,
            profiles: DashMap::new(),
            memory: None,
        }
    }

    pub fn with_memory(config: PreferenceConfig, memory: MemoryManager) -> Self {
        Self {
            config,
            profiles: DashMap::new(),
            memory: Some(memory),
        }
    }

    pub fn config(&self) -> &PreferenceConfig {
        &self.config
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Observations for one turn. Pure; nothing is applied.
    pub fn extract_observations(&self, text: &str, intent: &Intent) -> Vec<PreferenceObservation> {
        extractors::extract_all(text, intent)
    }

    /// Extract and apply in one step.
    pub fn update_preferences(
        &self,
        user_id: &str,
        text: &str,
        intent: &Intent,
        now: DateTime<Utc>,
    ) -> Vec<UserPreference> {
        let observations = self.extract_observations(text, intent);
        self.apply_observations(user_id, &intent.flags, &observations, now)
    }

    /// Merge observations, update interaction counters, decay, re-tier.
    /// Returns the touched preferences as merged.
    pub fn apply_observations(
        &self,
        user_id: &str,
        flags: &ContextFlags,
        observations: &[PreferenceObservation],
        now: DateTime<Utc>,
    ) -> Vec<UserPreference> {
        let handle = self.handle(user_id, now);
        let mut profile = lock(&handle);
        let touched: Vec<UserPreference> = observations
            .iter()
            .map(|obs| {
                merge_observation(
                    &mut profile.preferences,
                    user_id,
                    obs,
                    now,
                    self.config.weight_cap,
                )
            })
            .collect();

        profile.total_interactions += 1;
        let patterns = &mut profile.interaction_patterns;
        patterns.questions_asked += u64::from(flags.has_question_mark);
        patterns.exclamations += u64::from(flags.has_exclamation);
        patterns.total_words += flags.word_count as u64;

        let stats = decay::apply_decay(&mut profile, now, &self.config);
        profile.personalization_level = tier::level_for(&profile, &self.config);
        profile.last_updated_at = now;

        tracing::debug!(
            user_id = %user_id,
            touched = touched.len(),
            pruned = stats.pruned,
            level = %profile.personalization_level.as_str(),
            "preferences updated"
        );
        self.persist(&profile, now);
        touched
    }

    /// Response-shaping hints. Does not mutate the profile.
    pub fn get_modifiers(&self, user_id: &str) -> PersonalizationModifiers {
        match self.existing(user_id) {
            Some(handle) => modifiers_for(&lock(&handle)),
            None => PersonalizationModifiers::default(),
        }
    }

    pub fn get_profile(&self, user_id: &str) -> Option<UserProfile> {
        self.existing(user_id).map(|handle| lock(&handle).clone())
    }

    pub fn get_user_insights(&self, user_id: &str) -> Option<UserInsights> {
        self.existing(user_id)
            .map(|handle| UserInsights::from_profile(&lock(&handle)))
    }

    pub fn record_session(&self, user_id: &str, now: DateTime<Utc>) {
        let handle = self.handle(user_id, now);
        let mut profile = lock(&handle);
        profile.session_count += 1;
        profile.last_updated_at = now;
        self.persist(&profile, now);
    }

    /// Decay every loaded profile. Each profile is locked only for its own pass.
    pub fn apply_decay_all(&self, now: DateTime<Utc>) -> DecayStats {
        let handles: Vec<Arc<Mutex<UserProfile>>> =
            self.profiles.iter().map(|e| Arc::clone(e.value())).collect();

        let mut total = DecayStats::default();
        for handle in handles {
            let mut profile = lock(&handle);
            let stats = decay::apply_decay(&mut profile, now, &self.config);
            total.decayed += stats.decayed;
            total.pruned += stats.pruned;
            if stats.decayed > 0 {
                profile.personalization_level = tier::level_for(&profile, &self.config);
                self.persist(&profile, now);
            }
        }
        total
    }

    /// Loaded users most similar to `user_id`, descending, at or above the
    /// configured minimum similarity.
    pub fn get_similar_users(&self, user_id: &str, limit: usize) -> Vec<(String, f64)> {
        let Some(target) = self.get_profile(user_id) else {
            return Vec::new();
        };
        let others: Vec<(String, Arc<Mutex<UserProfile>>)> = self
            .profiles
            .iter()
            .filter(|e| e.key() != user_id)
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();

        let mut scored: Vec<(String, f64)> = others
            .into_iter()
            .map(|(other_id, handle)| {
                let score = profile_similarity(&target, &lock(&handle));
                (other_id, score)
            })
            .filter(|(_, score)| *score >= self.config.similarity_threshold)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(limit);
        scored
    }

    pub fn export_profile(&self, user_id: &str) -> Option<ExportedProfile> {
        self.existing(user_id)
            .map(|handle| ExportedProfile::from_profile(&lock(&handle)))
    }

    /// Validate the whole payload, then replace the user's profile.
    pub fn import_profile(
        &self,
        data: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, ProfileImportError> {
        let profile = ExportedProfile::parse(data)?.into_profile(self.config.weight_cap)?;
        let user_id = profile.user_id.clone();
        let handle = Arc::clone(
            self.profiles
                .entry(user_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(UserProfile::new(&user_id, now))))
                .value(),
        );
        let mut live = lock(&handle);
        *live = profile.clone();
        self.persist(&live, now);
        drop(live);
        tracing::info!(
            user_id = %user_id,
            preferences = profile.preference_count(),
            "profile imported"
        );
        Ok(profile)
    }

    fn handle(&self, user_id: &str, now: DateTime<Utc>) -> Arc<Mutex<UserProfile>> {
        if let Some(handle) = self.existing(user_id) {
            return handle;
        }
        let entry = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserProfile::new(user_id, now))));
        Arc::clone(entry.value())
    }

    /// Loaded profile, or one recovered from the memory store.
    fn existing(&self, user_id: &str) -> Option<Arc<Mutex<UserProfile>>> {
        if let Some(entry) = self.profiles.get(user_id) {
            return Some(Arc::clone(entry.value()));
        }
        let loaded = self.load_persisted(user_id)?;
        let entry = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(loaded)));
        Some(Arc::clone(entry.value()))
    }

    fn load_persisted(&self, user_id: &str) -> Option<UserProfile> {
        let memory = self.memory.as_ref()?;
        let item = match memory.storage().get(&profile_memory_id(user_id)) {
            Ok(item) => item?,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "profile load failed");
                return None;
            }
        };
        match serde_json::from_value::<UserProfile>(item.content) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "stored profile is unreadable");
                None
            }
        }
    }

    fn persist(&self, profile: &UserProfile, now: DateTime<Utc>) {
        let Some(memory) = &self.memory else {
            return;
        };
        if let Err(e) = store_profile(memory, profile, now) {
            tracing::warn!(user_id = %profile.user_id, error = %e, "profile persistence failed");
        }
    }
}

fn store_profile(
    memory: &MemoryManager,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> ColloquyResult<()> {
    let mut metadata = Metadata::new();
    metadata.insert(META_USER_ID.into(), serde_json::json!(profile.user_id));
    let item = MemoryItem {
        id: profile_memory_id(&profile.user_id),
        memory_type: MemoryType::Semantic,
        scope: MemoryScope::User,
        content: serde_json::to_value(profile)?,
        created_at: now,
        expires_at: None,
        access_count: 0,
        last_accessed_at: None,
        importance: PROFILE_IMPORTANCE,
        tags: BTreeSet::from(["preferences".to_string(), "profile".to_string()]),
        metadata,
    };
    memory.store(&item)?;
    Ok(())
}
