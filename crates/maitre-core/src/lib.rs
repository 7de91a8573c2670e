//! Maitre core: the stateful recommendation-and-context engine.
//!
//! This crate owns the parts of the dining assistant with real invariants:
//! isolated per-table session state, contextual reference resolution,
//! hard dietary/allergen filtering, deterministic multi-factor ranking,
//! and group accommodation. Natural-language understanding, transport,
//! and menu persistence live in external layers and reach this core only
//! through structured inputs.

pub mod context;
pub mod dish;
pub mod error;
pub mod filter;
pub mod group;
pub mod preference;
pub mod scoring;
pub mod session;

// Re-export common error type
pub use error::{MaitreError, Result};
