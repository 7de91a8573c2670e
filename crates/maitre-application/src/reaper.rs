//! Idle-session reaper.
//!
//! Background scheduler that archives sessions idle beyond the registry's
//! threshold and evicts archived records past retention. The registry
//! itself only exposes the sweep operations; this scheduler is the
//! external trigger.

use chrono::Utc;
use maitre_core::error::Result;
use maitre_core::session::SessionRegistry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::interval;

/// Spawns the periodic reaper loop.
pub struct ReaperScheduler {
    running: AtomicBool,
}

impl ReaperScheduler {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Starts the background sweep loop.
    ///
    /// At most one loop runs per scheduler instance; a second call is a
    /// logged no-op.
    pub fn start(&self, registry: Arc<SessionRegistry>, interval_secs: u64) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("[Reaper] Scheduler already running, skipping");
            return;
        }

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_secs));
            tracing::info!(target: "reaper", "Scheduler started ({}s interval)", interval_secs);

            loop {
                ticker.tick().await;
                tracing::debug!(target: "reaper", "Tick - sweeping idle sessions");

                if let Err(e) = run_sweep(&registry).await {
                    tracing::error!(target: "reaper", "Sweep failed: {}", e);
                }
            }
        });
    }
}

impl Default for ReaperScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a single sweep: archive the idle, evict the expired.
///
/// Returns `(archived, evicted)` counts.
pub async fn run_sweep(registry: &SessionRegistry) -> Result<(usize, usize)> {
    let now = Utc::now();
    let reaped = registry.reap_idle(now).await?;
    if !reaped.is_empty() {
        tracing::info!(target: "reaper", "Archived {} idle sessions", reaped.len());
    }
    let evicted = registry.evict_archived(now).await;
    if evicted > 0 {
        tracing::debug!(target: "reaper", "Evicted {} archived sessions", evicted);
    }
    Ok((reaped.len(), evicted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use maitre_core::session::{ArchiveRepository, RegistryConfig, Session};
    use maitre_core::error::Result;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingArchive {
        saved: Mutex<HashMap<String, Session>>,
    }

    #[async_trait::async_trait]
    impl ArchiveRepository for RecordingArchive {
        async fn save(&self, session: &Session) -> Result<()> {
            self.saved
                .lock()
                .unwrap()
                .insert(session.id.clone(), session.clone());
            Ok(())
        }

        async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
            Ok(self.saved.lock().unwrap().get(session_id).cloned())
        }

        async fn list_all(&self) -> Result<Vec<Session>> {
            Ok(vec![])
        }

        async fn delete(&self, _session_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn sweep_of_fresh_sessions_is_a_no_op() {
        let registry = SessionRegistry::new(
            Arc::new(RecordingArchive {
                saved: Mutex::new(HashMap::new()),
            }),
            RegistryConfig::default(),
        );
        registry.create("t1", 2).await.unwrap();

        let (archived, evicted) = run_sweep(&registry).await.unwrap();
        assert_eq!((archived, evicted), (0, 0));
        assert!(
            registry
                .active_session_for_table("t1")
                .await
                .is_some()
        );
    }
}
