//! Customer preference model.
//!
//! Preferences live inside a session's customer sub-records; they have no
//! independent lifecycle of their own.

use crate::dish::{Allergen, DietaryClass, FlavorProfile, SPICE_MAX};
use crate::error::{MaitreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper bound of the adventurousness score.
pub const ADVENTUROUSNESS_MAX: f32 = 1.0;

/// Everything the scoring and filtering components need to know about one
/// customer.
///
/// Allergens here are "must avoid" constraints, distinct from the allergen
/// facts a dish carries. Set-valued fields are deduplicated by construction
/// (`BTreeSet`). Out-of-range numeric input is rejected by [`validate`],
/// never clamped silently.
///
/// [`validate`]: CustomerPreferences::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPreferences {
    /// Dietary restrictions the customer requires compliance with
    #[serde(default)]
    pub dietary_restrictions: BTreeSet<DietaryClass>,
    /// Allergens the customer must strictly avoid
    #[serde(default)]
    pub allergens: BTreeSet<Allergen>,
    /// Desired flavor profile across the seven axes
    #[serde(default)]
    pub flavor: FlavorProfile,
    /// Spice tolerance in `0..=SPICE_MAX`
    #[serde(default)]
    pub spice_tolerance: u8,
    /// Cuisine types the customer is familiar with (lowercase)
    #[serde(default)]
    pub familiar_cuisines: BTreeSet<String>,
    /// How strongly to favor unfamiliar dishes, in `0.0..=1.0`
    #[serde(default)]
    pub adventurousness: f32,
    /// Free-text notes from the waiter, passed through untouched
    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for CustomerPreferences {
    fn default() -> Self {
        Self {
            dietary_restrictions: BTreeSet::new(),
            allergens: BTreeSet::new(),
            flavor: FlavorProfile::neutral(),
            spice_tolerance: 5,
            familiar_cuisines: BTreeSet::new(),
            adventurousness: 0.5,
            notes: None,
        }
    }
}

impl CustomerPreferences {
    /// Validates all bounded fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if spice tolerance, adventurousness, or any
    /// flavor axis is outside its declared bounds.
    pub fn validate(&self) -> Result<()> {
        const OP: &str = "preference validation";

        if self.spice_tolerance > SPICE_MAX {
            return Err(MaitreError::invalid_argument(
                OP,
                format!(
                    "spice tolerance {} exceeds {}",
                    self.spice_tolerance, SPICE_MAX
                ),
            ));
        }
        if !(0.0..=ADVENTUROUSNESS_MAX).contains(&self.adventurousness)
            || self.adventurousness.is_nan()
        {
            return Err(MaitreError::invalid_argument(
                OP,
                format!("adventurousness out of range: {}", self.adventurousness),
            ));
        }
        self.flavor.validate(OP)?;
        Ok(())
    }

    /// True when the customer's familiarity set contains the cuisine.
    pub fn is_familiar_with(&self, cuisine: &str) -> bool {
        self.familiar_cuisines.contains(&cuisine.to_lowercase())
    }
}

/// One seat at the table: a customer identifier plus their preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier, unique within the owning session
    pub id: String,
    /// Display name used by the presentation layer
    pub name: String,
    /// The customer's stored preferences
    pub preferences: CustomerPreferences,
}

impl Customer {
    /// Creates a guest seat with default preferences.
    pub fn guest(index: usize) -> Self {
        Self {
            id: format!("guest-{}", index),
            name: format!("Guest {}", index),
            preferences: CustomerPreferences::default(),
        }
    }
}
