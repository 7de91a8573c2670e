//! Storage DTOs.
//!
//! The archival file format is decoupled from the domain model so the
//! on-disk layout can evolve without touching core types.

mod session;

pub use session::ArchivedSessionDto;
