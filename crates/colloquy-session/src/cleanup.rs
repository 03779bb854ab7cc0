//! Expired session purge.

use chrono::{DateTime, Utc};

use crate::manager::SessionManager;

impl SessionManager {
    /// Remove sessions idle past the timeout. Sessions locked by an
    /// in-flight turn are skipped and revisited next sweep.
    pub fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> usize {
        let timeout = self.timeout;
        let mut removed = 0;
        for session_id in self.session_ids() {
            let evicted = self.sessions.remove_if(&session_id, |_, handle| {
                handle
                    .try_lock()
                    .map(|session| session.is_expired(now, timeout))
                    .unwrap_or(false)
            });
            if evicted.is_some() {
                tracing::debug!(session_id = %session_id, "purged expired session");
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "expired sessions purged");
        }
        removed
    }
}
