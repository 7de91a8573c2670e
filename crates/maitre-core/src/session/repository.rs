//! Archive repository trait.
//!
//! Defines the interface for the archival store that takes ownership of a
//! session once it ends.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for archived sessions.
///
/// On `SessionRegistry::end`, the full session snapshot (customers,
/// preferences, ordered conversation history, timestamps) is handed to this
/// store. The stored record must be fully reconstructible into an
/// equivalent non-Active [`Session`].
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Durable, atomic writes (a retried `end` may save the same snapshot twice)
/// - Concurrent access if needed
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Persists an archived session snapshot.
    ///
    /// Saving the same session id again overwrites the previous record.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Finds an archived session by its id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))`: record found and reconstructed
    /// - `Ok(None)`: no record for this id
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Lists all archived sessions, most recently active first.
    async fn list_all(&self) -> Result<Vec<Session>>;

    /// Deletes an archived record. Deleting a missing record is not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;
}
