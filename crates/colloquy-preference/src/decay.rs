//! Whole-day multiplicative decay with pruning.

use chrono::{DateTime, Duration, Utc};

use colloquy_core::config::PreferenceConfig;
use colloquy_core::models::{UserPreference, UserProfile};

/// Outcome of one decay pass over a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayStats {
    pub decayed: usize,
    pub pruned: usize,
}

/// `rate^days`.
pub fn decay_factor(rate: f64, days: i64) -> f64 {
    let days = i32::try_from(days.max(0)).unwrap_or(i32::MAX);
    rate.powi(days)
}

/// Whole days not yet decayed for this preference.
pub fn pending_days(pref: &UserPreference, now: DateTime<Utc>) -> i64 {
    let anchor = pref
        .last_decayed_at
        .map_or(pref.updated_at, |at| at.max(pref.updated_at));
    (now - anchor).num_days().max(0)
}

/// Decay one preference in place. Returns true when it changed.
pub fn decay_preference(pref: &mut UserPreference, now: DateTime<Utc>, rate: f64) -> bool {
    let days = pending_days(pref, now);
    if days == 0 {
        return false;
    }
    let factor = decay_factor(rate, days);
    pref.weight *= factor;
    pref.confidence *= factor;
    let anchor = pref
        .last_decayed_at
        .map_or(pref.updated_at, |at| at.max(pref.updated_at));
    pref.last_decayed_at = Some(anchor + Duration::days(days));
    true
}

/// Decay every preference, prune those under the confidence floor, drop
/// preference types left empty.
pub fn apply_decay(profile: &mut UserProfile, now: DateTime<Utc>, config: &PreferenceConfig) -> DecayStats {
    let mut stats = DecayStats::default();
    for by_key in profile.preferences.values_mut() {
        by_key.retain(|_, pref| {
            if decay_preference(pref, now, config.decay_rate) {
                stats.decayed += 1;
            }
            let keep = pref.confidence >= config.min_confidence;
            if !keep {
                stats.pruned += 1;
            }
            keep
        });
    }
    profile.preferences.retain(|_, by_key| !by_key.is_empty());
    stats
}
