//! Application layer for Maitre.
//!
//! This crate provides the facade the external query/API layer calls,
//! coordinating the domain core with the infrastructure implementations.

pub mod concierge;
pub mod reaper;

pub use concierge::{ConciergeService, SessionContext};
pub use reaper::ReaperScheduler;
