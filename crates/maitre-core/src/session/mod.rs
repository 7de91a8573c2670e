//! Session domain module.
//!
//! This module contains all session-related domain models, the archival
//! repository interface, and the registry that owns session lifecycle.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `SessionStatus`)
//! - `history`: Conversation history types (`QueryIntent`, `HistoryEntry`)
//! - `repository`: Repository trait for archival persistence
//! - `registry`: Session lifecycle and isolation (`SessionRegistry`)

mod history;
mod model;
mod registry;
mod repository;

// Re-export public API
pub use history::{HistoryEntry, QueryIntent};
pub use model::{MAX_CUSTOMERS, Session, SessionStatus};
pub use registry::{RegistryConfig, SessionRegistry};
pub use repository::ArchiveRepository;
