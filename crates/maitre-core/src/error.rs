//! Error types for the Maitre recommendation core.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Maitre core.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Every variant carries enough
/// context (operation, identifiers) for the caller's logging layer to record
/// the failure without re-deriving state.
#[derive(Error, Debug, Clone, Serialize)]
pub enum MaitreError {
    /// Malformed input rejected before any state mutation
    #[error("Invalid argument for {operation}: {message}")]
    InvalidArgument {
        operation: &'static str,
        message: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An active session already exists for the table.
    ///
    /// Carries the existing session identifier so the caller can redirect
    /// instead of retrying blindly.
    #[error("Table '{table_id}' already has an active session '{existing_session_id}'")]
    Conflict {
        table_id: String,
        existing_session_id: String,
    },

    /// Mutation attempted on a session that is no longer mutable
    #[error("Cannot {operation} on session '{session_id}': session is {status}")]
    InvalidState {
        operation: &'static str,
        session_id: String,
        status: String,
    },

    /// A contextual reference could not be resolved from conversation history.
    ///
    /// This is a request for clarification, not a fatal error.
    #[error("Ambiguous reference '{reference}' in session '{session_id}'")]
    AmbiguousReference {
        session_id: String,
        reference: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MaitreError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidArgument error
    pub fn invalid_argument(operation: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation,
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(table_id: impl Into<String>, existing_session_id: impl Into<String>) -> Self {
        Self::Conflict {
            table_id: table_id.into(),
            existing_session_id: existing_session_id.into(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(
        operation: &'static str,
        session_id: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            operation,
            session_id: session_id.into(),
            status: status.into(),
        }
    }

    /// Creates an AmbiguousReference error
    pub fn ambiguous(session_id: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::AmbiguousReference {
            session_id: session_id.into(),
            reference: reference.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an InvalidArgument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Check if this is an AmbiguousReference error
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousReference { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MaitreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MaitreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MaitreError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MaitreError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (for interop at infrastructure seams)
impl From<anyhow::Error> for MaitreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for MaitreError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, MaitreError>`.
pub type Result<T> = std::result::Result<T, MaitreError>;
