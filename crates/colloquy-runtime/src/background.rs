//! Periodic maintenance sweeps, one tokio task per schedule.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::Instrument;

use colloquy_observability::sweep_span;

use crate::runtime::ColloquyRuntime;

/// Handles of the running sweeps. Dropping this does not stop them.
pub struct BackgroundTasks {
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// True while every sweep is still scheduled.
    pub fn is_running(&self) -> bool {
        self.handles.iter().all(|h| !h.is_finished())
    }

    /// Abort every sweep and wait for the tasks to wind down.
    pub async fn shutdown(self) {
        for handle in &self.handles {
            handle.abort();
        }
        for handle in self.handles {
            // Aborted tasks resolve to a cancellation error.
            let _ = handle.await;
        }
        tracing::info!("background sweeps stopped");
    }
}

impl ColloquyRuntime {
    /// Start the memory, session, decay and context sweeps on their configured
    /// intervals. Must be called from within a tokio runtime.
    pub fn spawn_background(self: &Arc<Self>) -> BackgroundTasks {
        let sweep = &self.config().sweep;
        let handles = vec![
            spawn_sweep("memory", sweep.memory_interval_secs, {
                let rt = Arc::clone(self);
                move || {
                    let rt = Arc::clone(&rt);
                    async move {
                        match tokio::task::spawn_blocking(move || rt.sweep_memories(Utc::now())).await {
                            Ok(Ok(_)) => {}
                            Ok(Err(e)) => tracing::warn!(error = %e, "memory sweep failed"),
                            Err(e) => tracing::warn!(error = %e, "memory sweep task failed"),
                        }
                    }
                }
            }),
            spawn_sweep("session", sweep.session_interval_secs, {
                let rt = Arc::clone(self);
                move || {
                    let rt = Arc::clone(&rt);
                    async move {
                        let removed = rt.sweep_sessions(Utc::now());
                        if removed > 0 {
                            tracing::info!(removed, "expired sessions purged");
                        }
                    }
                }
            }),
            spawn_sweep("decay", sweep.decay_interval_secs, {
                let rt = Arc::clone(self);
                move || {
                    let rt = Arc::clone(&rt);
                    async move {
                        match tokio::task::spawn_blocking(move || rt.sweep_decay(Utc::now())).await {
                            Ok(stats) if stats.decayed > 0 || stats.pruned > 0 => tracing::info!(
                                decayed = stats.decayed,
                                pruned = stats.pruned,
                                "preference decay applied"
                            ),
                            Ok(_) => {}
                            Err(e) => tracing::warn!(error = %e, "decay sweep task failed"),
                        }
                    }
                }
            }),
            spawn_sweep("context", sweep.context_interval_secs, {
                let rt = Arc::clone(self);
                move || {
                    let rt = Arc::clone(&rt);
                    async move {
                        let evicted = rt.sweep_contexts(Utc::now());
                        if evicted > 0 {
                            tracing::info!(evicted, "inactive contexts evicted");
                        }
                    }
                }
            }),
        ];
        tracing::info!(tasks = handles.len(), "background sweeps started");
        BackgroundTasks { handles }
    }
}

fn spawn_sweep<F, Fut>(name: &'static str, every_secs: u64, mut run: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let period = Duration::from_secs(every_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            run().instrument(sweep_span!(name)).await;
        }
    })
}
