//! Conversation history types.
//!
//! History entries record which dishes and customers were in focus after
//! each structured query, so later contextual references ("it", "they")
//! can be resolved against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Closed set of query intents produced by the external NLU layer.
///
/// The core consumes these tags; it never produces or parses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryIntent {
    Information,
    Allergen,
    Recommendation,
    Pairing,
    Substitution,
    DietaryFilter,
}

/// A single entry in a session's ordered conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// What kind of query produced this entry
    pub intent: QueryIntent,
    /// Dishes in focus after the exchange, primary focus first
    #[serde(default)]
    pub dishes_in_focus: Vec<String>,
    /// Customers in focus after the exchange
    #[serde(default)]
    pub customers_in_focus: Vec<String>,
    /// When the exchange happened
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(
        intent: QueryIntent,
        dishes_in_focus: Vec<String>,
        customers_in_focus: Vec<String>,
    ) -> Self {
        Self {
            intent,
            dishes_in_focus,
            customers_in_focus,
            timestamp: Utc::now(),
        }
    }
}
