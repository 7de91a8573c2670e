//! Context resolver.
//!
//! Binds tagged reference expressions ("it", "the customer", "they")
//! against a session's conversation history. The resolver never guesses:
//! when no qualifying history entry exists it returns
//! `AmbiguousReference` so the external NLU layer can ask for
//! clarification.

use crate::error::{MaitreError, Result};
use crate::session::{HistoryEntry, QueryIntent, SessionRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;

/// Tagged reference kinds produced by the external entity-extraction layer.
///
/// Free text never reaches this core; by the time a reference arrives here
/// it has already been classified into one of these forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceKind {
    /// "it", "this dish", "that one"
    LastDish,
    /// "the customer", "she", "he" - the most recently focused customer
    LastCustomer,
    /// "they", "everyone", "the table" - all customers in the session
    Group,
}

/// The entity a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedEntity {
    Dish(String),
    Customer(String),
    Customers(Vec<String>),
}

/// Resolves contextual references against session state.
pub struct ContextResolver {
    registry: Arc<SessionRegistry>,
}

impl ContextResolver {
    /// Creates a resolver over the given registry.
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves a tagged reference against the session's history.
    ///
    /// Resolution policy:
    /// - `LastDish`: the primary dish of the most recent dish-bearing
    ///   history entry
    /// - `LastCustomer`: the single customer of the most recent
    ///   customer-bearing entry; a plural focus is ambiguous
    /// - `Group`: all customers currently seated
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session is unknown
    /// - `AmbiguousReference` when no qualifying entry exists; the caller
    ///   must request clarification rather than have this core guess
    pub async fn resolve(&self, session_id: &str, kind: ReferenceKind) -> Result<ResolvedEntity> {
        let session = self.registry.get(session_id).await?;

        match kind {
            ReferenceKind::LastDish => session
                .last_dish_discussed()
                .map(|dish| ResolvedEntity::Dish(dish.to_string()))
                .ok_or_else(|| MaitreError::ambiguous(session_id, kind.to_string())),
            ReferenceKind::LastCustomer => match session.last_customer_focus() {
                Some([single]) => Ok(ResolvedEntity::Customer(single.clone())),
                // Plural or missing focus: clarification required
                _ => Err(MaitreError::ambiguous(session_id, kind.to_string())),
            },
            ReferenceKind::Group => {
                let ids = session.customer_ids();
                if ids.is_empty() {
                    return Err(MaitreError::ambiguous(session_id, kind.to_string()));
                }
                Ok(ResolvedEntity::Customers(ids))
            }
        }
    }

    /// Records a completed exchange in conversation history.
    ///
    /// Every successful query that mentioned a dish or customer must call
    /// this so that subsequent references resolve against it; the append is
    /// ordered by the session's write lock.
    pub async fn record_exchange(
        &self,
        session_id: &str,
        intent: QueryIntent,
        dishes_in_focus: Vec<String>,
        customers_in_focus: Vec<String>,
    ) -> Result<()> {
        self.registry
            .append_history(
                session_id,
                HistoryEntry::new(intent, dishes_in_focus, customers_in_focus),
            )
            .await
    }
}
