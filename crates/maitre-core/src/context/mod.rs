//! Contextual reference resolution.

mod resolver;

pub use resolver::{ContextResolver, ReferenceKind, ResolvedEntity};
