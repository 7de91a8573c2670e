//! Archived session DTO.

use chrono::{DateTime, Utc};
use maitre_core::error::{MaitreError, Result};
use maitre_core::preference::Customer;
use maitre_core::session::{HistoryEntry, Session, SessionStatus};
use serde::{Deserialize, Serialize};

/// On-disk representation of an archived session.
///
/// Timestamps are RFC 3339 strings; everything else reuses the domain
/// serde forms. The record is fully reconstructible into an equivalent
/// non-Active [`Session`] via [`ArchivedSessionDto::into_session`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedSessionDto {
    /// Format version for forward-compatible readers
    pub schema_version: u32,
    pub id: String,
    pub table_id: String,
    pub status: String,
    pub created_at: String,
    pub last_activity_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Current schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

impl From<&Session> for ArchivedSessionDto {
    fn from(session: &Session) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            id: session.id.clone(),
            table_id: session.table_id.clone(),
            status: session.status.to_string(),
            created_at: session.created_at.to_rfc3339(),
            last_activity_at: session.last_activity_at.to_rfc3339(),
            ended_at: session.ended_at.map(|t| t.to_rfc3339()),
            customers: session.customers.clone(),
            history: session.history.clone(),
        }
    }
}

impl ArchivedSessionDto {
    /// Reconstructs the domain session from the stored record.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error if a timestamp or status field
    /// cannot be parsed.
    pub fn into_session(self) -> Result<Session> {
        let status = match self.status.as_str() {
            "active" => SessionStatus::Active,
            "archived" => SessionStatus::Archived,
            other => {
                return Err(MaitreError::Serialization {
                    format: "TOML".to_string(),
                    message: format!("unknown session status '{}'", other),
                });
            }
        };

        let ended_at = match self.ended_at {
            Some(raw) => Some(parse_timestamp(&raw)?),
            None => None,
        };

        Ok(Session {
            id: self.id,
            table_id: self.table_id,
            customers: self.customers,
            history: self.history,
            status,
            created_at: parse_timestamp(&self.created_at)?,
            last_activity_at: parse_timestamp(&self.last_activity_at)?,
            ended_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MaitreError::Serialization {
            format: "TOML".to_string(),
            message: format!("bad timestamp '{}': {}", raw, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use maitre_core::session::QueryIntent;

    #[test]
    fn round_trips_an_archived_session() {
        let mut session = Session::new("table-3", 2);
        session.history.push(HistoryEntry::new(
            QueryIntent::Recommendation,
            vec!["pho".to_string()],
            vec!["guest-2".to_string()],
        ));
        session.archive();

        let dto = ArchivedSessionDto::from(&session);
        let restored = dto.into_session().unwrap();

        assert_eq!(restored.id, session.id);
        assert_eq!(restored.status, SessionStatus::Archived);
        assert_eq!(restored.customers.len(), 2);
        assert_eq!(restored.history, session.history);
        // RFC 3339 round-trip keeps ordering-relevant precision
        assert_eq!(
            restored.created_at.timestamp_micros(),
            session.created_at.timestamp_micros()
        );
    }

    #[test]
    fn unknown_status_is_a_serialization_error() {
        let session = Session::new("table-3", 1);
        let mut dto = ArchivedSessionDto::from(&session);
        dto.status = "resurrected".to_string();

        let err = dto.into_session().unwrap_err();
        assert!(matches!(err, MaitreError::Serialization { .. }));
    }
}
