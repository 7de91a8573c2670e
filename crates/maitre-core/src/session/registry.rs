//! Session registry.
//!
//! Owns session lifecycle, isolation, and archival. Each session is an
//! independently lockable unit: operations on one table never block
//! operations on another. Within a session, mutations are serialized
//! through a per-session write lock so conversation-history ordering is
//! preserved and near-simultaneous waiter actions cannot lose updates.

use super::history::HistoryEntry;
use super::model::{MAX_CUSTOMERS, Session, SessionStatus};
use super::repository::ArchiveRepository;
use crate::error::{MaitreError, Result};
use crate::preference::{Customer, CustomerPreferences};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tunables for session lifecycle housekeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Seconds of inactivity after which the reaper may archive a session
    pub idle_threshold_secs: i64,
    /// Seconds an archived session stays readable in memory before eviction
    pub retention_secs: i64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: 30 * 60,
            retention_secs: 60 * 60,
        }
    }
}

/// Map state guarded by a single registry-level lock.
///
/// The `tables` index holds exactly the Active sessions; `end` removes the
/// mapping in the same critical section that flips the status, so a create
/// racing an end can never observe a stale Active claim.
struct RegistryIndex {
    sessions: HashMap<String, Arc<RwLock<Session>>>,
    tables: HashMap<String, String>,
}

/// Manages multiple table sessions and their lifecycle.
///
/// `SessionRegistry` is responsible for:
/// - Creating new sessions (one Active session per table)
/// - Serving consistent snapshots for reads
/// - Serializing per-session mutations
/// - Archiving sessions (explicitly or via the idle reaper)
pub struct SessionRegistry {
    /// Per-session locks, keyed by session id
    index: RwLock<RegistryIndex>,
    /// Archival store that takes ownership of ended sessions
    archive: Arc<dyn ArchiveRepository>,
    config: RegistryConfig,
}

impl SessionRegistry {
    /// Creates a new registry backed by the given archival store.
    pub fn new(archive: Arc<dyn ArchiveRepository>, config: RegistryConfig) -> Self {
        Self {
            index: RwLock::new(RegistryIndex {
                sessions: HashMap::new(),
                tables: HashMap::new(),
            }),
            archive,
            config,
        }
    }

    /// Creates a new active session for a table.
    ///
    /// # Arguments
    ///
    /// * `table_id` - The table to open a session for
    /// * `customer_count` - Number of guests, `1..=10`
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `customer_count` is out of range
    /// - `Conflict` (carrying the existing session id) if the table already
    ///   has an Active session; the prior session must be ended explicitly
    pub async fn create(&self, table_id: &str, customer_count: usize) -> Result<Session> {
        if customer_count == 0 || customer_count > MAX_CUSTOMERS {
            return Err(MaitreError::invalid_argument(
                "create session",
                format!(
                    "customer count must be 1..={}, got {}",
                    MAX_CUSTOMERS, customer_count
                ),
            ));
        }

        let mut index = self.index.write().await;
        if let Some(existing) = index.tables.get(table_id) {
            return Err(MaitreError::conflict(table_id, existing.clone()));
        }

        let session = Session::new(table_id, customer_count);
        let snapshot = session.clone();
        index
            .tables
            .insert(table_id.to_string(), session.id.clone());
        index
            .sessions
            .insert(session.id.clone(), Arc::new(RwLock::new(session)));

        Ok(snapshot)
    }

    /// Returns a consistent snapshot of a session and refreshes its
    /// last-activity timestamp.
    ///
    /// Archived sessions remain readable until evicted; after eviction the
    /// archival store is the only source.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session is absent (never created, or
    /// archived and evicted).
    pub async fn get(&self, session_id: &str) -> Result<Session> {
        let entry = self.entry(session_id).await?;
        let mut session = entry.write().await;
        if session.is_active() {
            session.touch();
        }
        Ok(session.clone())
    }

    /// Replaces a customer's stored preferences.
    ///
    /// Input is validated before any state is touched.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the preferences fail validation
    /// - `NotFound` if the session or customer is unknown
    /// - `InvalidState` if the session is archived
    pub async fn set_preference(
        &self,
        session_id: &str,
        customer_id: &str,
        preferences: CustomerPreferences,
    ) -> Result<()> {
        preferences.validate()?;
        self.mutate(session_id, "set preference", |session| {
            let customer = session
                .customer_mut(customer_id)
                .ok_or_else(|| MaitreError::not_found("customer", customer_id))?;
            customer.preferences = preferences;
            Ok(())
        })
        .await
    }

    /// Seats an additional customer at an active session's table.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the preferences are invalid, the table is
    ///   full, or the customer id is already seated
    /// - `NotFound` / `InvalidState` as for any session mutation
    pub async fn add_customer(&self, session_id: &str, customer: Customer) -> Result<()> {
        customer.preferences.validate()?;
        self.mutate(session_id, "add customer", |session| {
            session.add_customer(customer)
        })
        .await
    }

    /// Appends an entry to a session's conversation history.
    ///
    /// Every successful query that mentions a dish or customer must pass
    /// through here so future references resolve correctly; entries are
    /// strictly ordered by the per-session write lock.
    pub async fn append_history(&self, session_id: &str, entry: HistoryEntry) -> Result<()> {
        self.mutate(session_id, "append history", |session| {
            session.history.push(entry);
            Ok(())
        })
        .await
    }

    /// Ends a session: `Active -> Archived`, snapshots the full session to
    /// the archival store, and frees the table for a new session.
    ///
    /// Idempotent: ending an already-archived session is a no-op. Once the
    /// snapshot hand-off begins the operation is not revocable.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session is unknown
    /// - Archival store errors are propagated; the in-memory transition has
    ///   already happened and will not be rolled back
    pub async fn end(&self, session_id: &str) -> Result<()> {
        let entry = self.entry(session_id).await?;

        let snapshot = {
            let mut session = entry.write().await;
            if !session.is_active() {
                return Ok(());
            }
            session.archive();
            // Release the table inside the same critical section so a
            // racing create cannot see a stale Active claim.
            let mut index = self.index.write().await;
            if index.tables.get(&session.table_id) == Some(&session.id) {
                index.tables.remove(&session.table_id);
            }
            session.clone()
        };

        self.archive.save(&snapshot).await
    }

    /// Archives every active session idle longer than the configured
    /// threshold. Invoked by an external trigger (the reaper scheduler).
    ///
    /// A failing archival save is logged and skipped so one broken record
    /// never blocks the rest of the sweep.
    ///
    /// Returns the ids of the sessions that were archived.
    pub async fn reap_idle(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let cutoff = now - Duration::seconds(self.config.idle_threshold_secs);

        let candidates: Vec<(String, Arc<RwLock<Session>>)> = {
            let index = self.index.read().await;
            index
                .sessions
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect()
        };

        let mut reaped = Vec::new();
        for (id, entry) in candidates {
            let idle = {
                let session = entry.read().await;
                session.is_active() && session.last_activity_at < cutoff
            };
            if idle {
                match self.end(&id).await {
                    Ok(()) => reaped.push(id),
                    Err(e) => {
                        tracing::warn!("Failed to archive idle session {}: {}", id, e);
                    }
                }
            }
        }
        Ok(reaped)
    }

    /// Evicts archived sessions whose retention window has elapsed.
    ///
    /// After eviction, `get` returns `NotFound`; the archival store keeps
    /// the authoritative record.
    ///
    /// Returns the number of evicted sessions.
    pub async fn evict_archived(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::seconds(self.config.retention_secs);

        let candidates: Vec<(String, Arc<RwLock<Session>>)> = {
            let index = self.index.read().await;
            index
                .sessions
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect()
        };

        let mut expired = Vec::new();
        for (id, entry) in candidates {
            let session = entry.read().await;
            if session.status == SessionStatus::Archived
                && session.ended_at.map(|t| t < cutoff).unwrap_or(false)
            {
                expired.push(id);
            }
        }

        let mut index = self.index.write().await;
        for id in &expired {
            index.sessions.remove(id);
        }
        expired.len()
    }

    /// Returns the Active session id for a table, if any.
    pub async fn active_session_for_table(&self, table_id: &str) -> Option<String> {
        let index = self.index.read().await;
        index.tables.get(table_id).cloned()
    }

    /// Fetches the per-session lock, dropping the registry guard before
    /// the caller awaits the session lock.
    async fn entry(&self, session_id: &str) -> Result<Arc<RwLock<Session>>> {
        let index = self.index.read().await;
        index
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| MaitreError::not_found("session", session_id))
    }

    /// Runs a mutation under the session's write lock, enforcing the
    /// Active-status invariant and refreshing the activity timestamp.
    async fn mutate<T, F>(&self, session_id: &str, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let entry = self.entry(session_id).await?;
        let mut session = entry.write().await;
        if !session.is_active() {
            return Err(MaitreError::invalid_state(
                operation,
                session_id,
                session.status.to_string(),
            ));
        }
        let value = f(&mut session)?;
        session.touch();
        Ok(value)
    }
}
