//! Session domain model.
//!
//! A session is the isolated conversational state for one table's service
//! interaction. It owns its customers, their preferences, and the ordered
//! conversation history; no other session may alias any of it.

use super::history::HistoryEntry;
use crate::error::{MaitreError, Result};
use crate::preference::Customer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Maximum number of customers a single table session can hold.
pub const MAX_CUSTOMERS: usize = 10;

/// Lifecycle status of a session. The only transition is
/// `Active -> Archived`; there is no resurrection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Archived,
}

/// Conversational state for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// The table this session serves
    pub table_id: String,
    /// Ordered list of customers at the table (at most [`MAX_CUSTOMERS`])
    pub customers: Vec<Customer>,
    /// Ordered conversation history, oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Lifecycle status
    pub status: SessionStatus,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Last read or write touching this session
    pub last_activity_at: DateTime<Utc>,
    /// When the session was archived, if it has been
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a new active session seating `customer_count` guests with
    /// default preferences.
    ///
    /// Caller is responsible for validating `customer_count`; the registry
    /// does so before any state is created.
    pub fn new(table_id: impl Into<String>, customer_count: usize) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            table_id: table_id.into(),
            customers: (1..=customer_count).map(Customer::guest).collect(),
            history: Vec::new(),
            status: SessionStatus::Active,
            created_at: now,
            last_activity_at: now,
            ended_at: None,
        }
    }

    /// True while the session accepts mutations.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Updates the last-activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Marks the session archived. Idempotent.
    pub fn archive(&mut self) {
        if self.status == SessionStatus::Active {
            self.status = SessionStatus::Archived;
            self.ended_at = Some(Utc::now());
        }
    }

    /// Looks up a customer by id.
    pub fn customer(&self, customer_id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == customer_id)
    }

    /// Looks up a customer by id, mutably.
    pub fn customer_mut(&mut self, customer_id: &str) -> Option<&mut Customer> {
        self.customers.iter_mut().find(|c| c.id == customer_id)
    }

    /// All customer ids at the table, in seating order.
    pub fn customer_ids(&self) -> Vec<String> {
        self.customers.iter().map(|c| c.id.clone()).collect()
    }

    /// Adds a customer to the table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the table is full or the id is already
    /// seated. Active-status enforcement is the registry's job.
    pub fn add_customer(&mut self, customer: Customer) -> Result<()> {
        const OP: &str = "add customer";

        if self.customers.len() >= MAX_CUSTOMERS {
            return Err(MaitreError::invalid_argument(
                OP,
                format!("table '{}' already seats {}", self.table_id, MAX_CUSTOMERS),
            ));
        }
        if self.customer(&customer.id).is_some() {
            return Err(MaitreError::invalid_argument(
                OP,
                format!("customer '{}' already seated", customer.id),
            ));
        }
        self.customers.push(customer);
        Ok(())
    }

    /// The most recently discussed dish, scanning history most-recent-first.
    ///
    /// Within an entry the primary focus is the first dish listed.
    pub fn last_dish_discussed(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|entry| !entry.dishes_in_focus.is_empty())
            .and_then(|entry| entry.dishes_in_focus.first())
            .map(String::as_str)
    }

    /// The most recent customer-bearing history entry, most-recent-first.
    pub fn last_customer_focus(&self) -> Option<&[String]> {
        self.history
            .iter()
            .rev()
            .find(|entry| !entry.customers_in_focus.is_empty())
            .map(|entry| entry.customers_in_focus.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::history::{HistoryEntry, QueryIntent};

    #[test]
    fn new_session_seats_requested_guests() {
        let session = Session::new("table-7", 3);
        assert_eq!(session.customers.len(), 3);
        assert_eq!(session.customers[0].id, "guest-1");
        assert!(session.is_active());
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn archive_is_one_way_and_idempotent() {
        let mut session = Session::new("table-7", 1);
        session.archive();
        let ended = session.ended_at;
        assert_eq!(session.status, SessionStatus::Archived);

        session.archive();
        assert_eq!(session.ended_at, ended);
    }

    #[test]
    fn last_dish_scan_is_most_recent_first() {
        let mut session = Session::new("table-1", 2);
        session.history.push(HistoryEntry::new(
            QueryIntent::Information,
            vec!["pad_thai".to_string()],
            vec![],
        ));
        session.history.push(HistoryEntry::new(
            QueryIntent::Allergen,
            vec!["green_curry".to_string(), "pad_thai".to_string()],
            vec![],
        ));
        session.history.push(HistoryEntry::new(
            QueryIntent::Recommendation,
            vec![],
            vec!["guest-1".to_string()],
        ));

        assert_eq!(session.last_dish_discussed(), Some("green_curry"));
        assert_eq!(
            session.last_customer_focus(),
            Some(&["guest-1".to_string()][..])
        );
    }

    #[test]
    fn table_capacity_is_enforced() {
        let mut session = Session::new("table-1", MAX_CUSTOMERS);
        let err = session
            .add_customer(Customer::guest(MAX_CUSTOMERS + 1))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
