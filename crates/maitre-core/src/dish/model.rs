//! Dish domain model.
//!
//! This module contains the dish entity, its ingredients, and the closed
//! allergen / dietary-classification vocabularies the filter and scoring
//! components operate on.

use crate::error::{MaitreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::Display;

/// Closed set of allergens tracked by the core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Allergen {
    Dairy,
    Egg,
    Fish,
    Shellfish,
    TreeNut,
    Peanut,
    Gluten,
    Soy,
    Sesame,
}

/// Dietary classification a dish can satisfy.
///
/// Each classification is a derived fact about the dish's ingredients,
/// not a freely assignable label. `Dish::validate` rejects dishes whose
/// declared classes contradict a non-substitutable ingredient.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DietaryClass {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    NutFree,
    ShellfishFree,
    Halal,
    Kosher,
}

impl DietaryClass {
    /// Allergens that contradict this classification when present in a
    /// non-substitutable ingredient.
    pub fn contradicting_allergens(&self) -> &'static [Allergen] {
        match self {
            Self::Vegan => &[
                Allergen::Dairy,
                Allergen::Egg,
                Allergen::Fish,
                Allergen::Shellfish,
            ],
            Self::Vegetarian => &[Allergen::Fish, Allergen::Shellfish],
            Self::GlutenFree => &[Allergen::Gluten],
            Self::DairyFree => &[Allergen::Dairy],
            Self::NutFree => &[Allergen::TreeNut, Allergen::Peanut],
            Self::ShellfishFree => &[Allergen::Shellfish],
            Self::Halal | Self::Kosher => &[],
        }
    }
}

/// The seven flavor axes every dish and every preference vector share.
///
/// Each axis is bounded to `0.0..=AXIS_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlavorProfile {
    pub sweet: f32,
    pub salty: f32,
    pub sour: f32,
    pub bitter: f32,
    pub umami: f32,
    pub spicy: f32,
    pub richness: f32,
}

/// Upper bound of every flavor axis.
pub const AXIS_MAX: f32 = 10.0;

/// Upper bound of spice levels and spice tolerance.
pub const SPICE_MAX: u8 = 10;

impl FlavorProfile {
    /// A neutral profile with every axis at the midpoint.
    pub fn neutral() -> Self {
        Self {
            sweet: 5.0,
            salty: 5.0,
            sour: 5.0,
            bitter: 5.0,
            umami: 5.0,
            spicy: 5.0,
            richness: 5.0,
        }
    }

    /// Returns the axes as a fixed-size array, in declaration order.
    pub fn as_array(&self) -> [f32; 7] {
        [
            self.sweet,
            self.salty,
            self.sour,
            self.bitter,
            self.umami,
            self.spicy,
            self.richness,
        ]
    }

    /// Checks that every axis is within `0.0..=AXIS_MAX`.
    pub fn validate(&self, operation: &'static str) -> Result<()> {
        for (axis, value) in [
            ("sweet", self.sweet),
            ("salty", self.salty),
            ("sour", self.sour),
            ("bitter", self.bitter),
            ("umami", self.umami),
            ("spicy", self.spicy),
            ("richness", self.richness),
        ] {
            if !(0.0..=AXIS_MAX).contains(&value) || value.is_nan() {
                return Err(MaitreError::invalid_argument(
                    operation,
                    format!("flavor axis '{}' out of range: {}", axis, value),
                ));
            }
        }
        Ok(())
    }
}

impl Default for FlavorProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A single ingredient of a dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name (e.g. "parmesan")
    pub name: String,
    /// Allergen carried by this ingredient, if any
    #[serde(default)]
    pub allergen: Option<Allergen>,
    /// Whether the ingredient is optional or substitutable
    #[serde(default)]
    pub substitutable: bool,
    /// Candidate substitutes (e.g. "nutritional yeast" for parmesan)
    #[serde(default)]
    pub substitutions: Vec<String>,
}

impl Ingredient {
    /// True when the kitchen can actually swap this ingredient out.
    pub fn has_substitute(&self) -> bool {
        self.substitutable && !self.substitutions.is_empty()
    }
}

/// A dish as served by the external menu catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    /// Unique dish identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Cuisine type (lowercase, e.g. "italian")
    pub cuisine: String,
    /// Ingredient list
    pub ingredients: Vec<Ingredient>,
    /// Flavor profile across the seven axes
    pub flavor: FlavorProfile,
    /// Spice level in `0..=SPICE_MAX`
    pub spice_level: u8,
    /// Dietary classifications this dish satisfies
    #[serde(default)]
    pub dietary_classes: BTreeSet<DietaryClass>,
    /// Allergens the dish is at cross-contamination risk for, beyond its
    /// own ingredients (shared fryer, shared prep surface, ...)
    #[serde(default)]
    pub cross_contamination: BTreeSet<Allergen>,
    /// Whether the kitchen can currently serve this dish
    #[serde(default = "default_available")]
    pub available: bool,
    /// Popularity indicator used by the external presentation layer
    #[serde(default)]
    pub popular: bool,
}

fn default_available() -> bool {
    true
}

impl Dish {
    /// The dish's allergen set, derived as the union of its ingredients'
    /// allergen flags. Derivation keeps the superset invariant by
    /// construction.
    pub fn allergens(&self) -> BTreeSet<Allergen> {
        self.ingredients
            .iter()
            .filter_map(|ingredient| ingredient.allergen)
            .collect()
    }

    /// Ingredients whose allergen is in `avoid` and which therefore make
    /// the dish unsafe for a customer avoiding those allergens.
    pub fn offending_ingredients(&self, avoid: &BTreeSet<Allergen>) -> Vec<&Ingredient> {
        self.ingredients
            .iter()
            .filter(|ingredient| {
                ingredient
                    .allergen
                    .map(|a| avoid.contains(&a))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Validates the dish's internal invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if:
    /// - the spice level or a flavor axis is out of range
    /// - a declared dietary class is contradicted by a non-substitutable
    ///   ingredient (e.g. "vegan" with fixed dairy)
    pub fn validate(&self) -> Result<()> {
        const OP: &str = "dish validation";

        if self.spice_level > SPICE_MAX {
            return Err(MaitreError::invalid_argument(
                OP,
                format!("spice level {} exceeds {}", self.spice_level, SPICE_MAX),
            ));
        }
        self.flavor.validate(OP)?;

        for class in &self.dietary_classes {
            for allergen in class.contradicting_allergens() {
                let fixed_conflict = self.ingredients.iter().any(|ingredient| {
                    ingredient.allergen == Some(*allergen) && !ingredient.has_substitute()
                });
                if fixed_conflict {
                    return Err(MaitreError::invalid_argument(
                        OP,
                        format!(
                            "dish '{}' claims {} but contains non-substitutable {}",
                            self.id, class, allergen
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_ingredient(name: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            allergen: None,
            substitutable: false,
            substitutions: vec![],
        }
    }

    #[test]
    fn allergens_are_derived_from_ingredients() {
        let dish = Dish {
            id: "caesar_salad".to_string(),
            name: "Caesar Salad".to_string(),
            cuisine: "italian".to_string(),
            ingredients: vec![
                plain_ingredient("romaine"),
                Ingredient {
                    name: "parmesan".to_string(),
                    allergen: Some(Allergen::Dairy),
                    substitutable: true,
                    substitutions: vec!["nutritional yeast".to_string()],
                },
                Ingredient {
                    name: "anchovy".to_string(),
                    allergen: Some(Allergen::Fish),
                    substitutable: false,
                    substitutions: vec![],
                },
            ],
            flavor: FlavorProfile::neutral(),
            spice_level: 1,
            dietary_classes: BTreeSet::new(),
            cross_contamination: BTreeSet::new(),
            available: true,
            popular: true,
        };

        let allergens = dish.allergens();
        assert!(allergens.contains(&Allergen::Dairy));
        assert!(allergens.contains(&Allergen::Fish));
        assert_eq!(allergens.len(), 2);
    }

    #[test]
    fn vegan_claim_with_fixed_dairy_is_rejected() {
        let dish = Dish {
            id: "fake_vegan".to_string(),
            name: "Fake Vegan".to_string(),
            cuisine: "fusion".to_string(),
            ingredients: vec![Ingredient {
                name: "butter".to_string(),
                allergen: Some(Allergen::Dairy),
                substitutable: false,
                substitutions: vec![],
            }],
            flavor: FlavorProfile::neutral(),
            spice_level: 0,
            dietary_classes: [DietaryClass::Vegan].into_iter().collect(),
            cross_contamination: BTreeSet::new(),
            available: true,
            popular: false,
        };

        let err = dish.validate().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn vegan_claim_with_substitutable_dairy_is_accepted() {
        let dish = Dish {
            id: "adaptable".to_string(),
            name: "Adaptable".to_string(),
            cuisine: "fusion".to_string(),
            ingredients: vec![Ingredient {
                name: "butter".to_string(),
                allergen: Some(Allergen::Dairy),
                substitutable: true,
                substitutions: vec!["olive oil".to_string()],
            }],
            flavor: FlavorProfile::neutral(),
            spice_level: 0,
            dietary_classes: [DietaryClass::Vegan].into_iter().collect(),
            cross_contamination: BTreeSet::new(),
            available: true,
            popular: false,
        };

        assert!(dish.validate().is_ok());
    }

    #[test]
    fn out_of_range_flavor_axis_is_rejected() {
        let mut flavor = FlavorProfile::neutral();
        flavor.umami = 11.5;
        assert!(flavor.validate("test").is_err());
    }
}
