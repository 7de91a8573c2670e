//! Dietary/allergen filter.
//!
//! A pure, deterministic function from (dish set, restriction set, personal
//! allergens) to a structured compliance outcome. Absence of matches is a
//! valid result, never an error: when nothing complies the outcome carries
//! the closest dishes (fewest violated constraints) as alternatives.

use crate::dish::{Allergen, DietaryClass, Dish};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How many closest alternatives to surface when nothing complies.
pub const DEFAULT_ALTERNATIVES: usize = 3;

/// A required ingredient swap that makes a dish compliant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionNote {
    /// The offending ingredient
    pub ingredient: String,
    /// Kitchen-approved substitutes, first is preferred
    pub substitutes: Vec<String>,
}

/// A dish that complies only with a stated modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiableDish {
    pub dish: Dish,
    /// The substitutions the kitchen must apply
    pub substitutions: Vec<SubstitutionNote>,
}

/// A nominally compliant dish excluded from safe results because of a
/// cross-contamination risk for one of the customer's allergens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlaggedDish {
    pub dish: Dish,
    /// The allergens at risk, for an explicit warning to the customer
    pub risk_allergens: BTreeSet<Allergen>,
}

/// A non-compliant dish offered as a closest alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeDish {
    pub dish: Dish,
    /// Total violated constraints, lower is closer
    pub violations: usize,
    /// Which requested restrictions the dish misses
    pub violated_restrictions: BTreeSet<DietaryClass>,
    /// Which personal allergens the dish contains without a substitute
    pub violated_allergens: BTreeSet<Allergen>,
}

/// The structured result of a filter pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// Dishes safe as served
    pub compliant: Vec<Dish>,
    /// Dishes safe with a stated substitution
    pub modifiable: Vec<ModifiableDish>,
    /// Dishes excluded from safe results over cross-contamination risk
    pub risk_flagged: Vec<RiskFlaggedDish>,
    /// Closest non-compliant dishes; populated only when `compliant` and
    /// `modifiable` are both empty
    pub alternatives: Vec<AlternativeDish>,
}

impl FilterOutcome {
    /// True when nothing is safe, with or without modification.
    pub fn has_no_compliant(&self) -> bool {
        self.compliant.is_empty() && self.modifiable.is_empty()
    }

    /// The compliant dishes plus the modifiable ones, for ranking.
    pub fn rankable_dishes(&self) -> Vec<Dish> {
        self.compliant
            .iter()
            .cloned()
            .chain(self.modifiable.iter().map(|m| m.dish.clone()))
            .collect()
    }
}

/// Per-dish classification, internal to the filter pass.
enum Verdict {
    Compliant,
    Modifiable(Vec<SubstitutionNote>),
    RiskFlagged(BTreeSet<Allergen>),
    Violating {
        restrictions: BTreeSet<DietaryClass>,
        allergens: BTreeSet<Allergen>,
    },
}

/// Filters a dish set against dietary restrictions and personal allergens.
///
/// A dish passes only if its dietary-classification set is a superset of
/// `restrictions` and its derived allergen set is disjoint from
/// `allergens`. A dish failing solely because of substitutable offending
/// ingredients is reclassified as compliant-with-modification. Dishes at
/// cross-contamination risk for a personal allergen are never "safe", even
/// when nominally compliant.
///
/// Unavailable dishes are ignored entirely.
pub fn filter_dishes(
    dishes: &[Dish],
    restrictions: &BTreeSet<DietaryClass>,
    allergens: &BTreeSet<Allergen>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    let mut rejected: Vec<AlternativeDish> = Vec::new();

    for dish in dishes.iter().filter(|d| d.available) {
        match classify(dish, restrictions, allergens) {
            Verdict::Compliant => outcome.compliant.push(dish.clone()),
            Verdict::Modifiable(substitutions) => outcome.modifiable.push(ModifiableDish {
                dish: dish.clone(),
                substitutions,
            }),
            Verdict::RiskFlagged(risk_allergens) => outcome.risk_flagged.push(RiskFlaggedDish {
                dish: dish.clone(),
                risk_allergens,
            }),
            Verdict::Violating {
                restrictions: violated_restrictions,
                allergens: violated_allergens,
            } => rejected.push(AlternativeDish {
                dish: dish.clone(),
                violations: violated_restrictions.len() + violated_allergens.len(),
                violated_restrictions,
                violated_allergens,
            }),
        }
    }

    if outcome.has_no_compliant() {
        rejected.sort_by(|a, b| {
            a.violations
                .cmp(&b.violations)
                .then_with(|| a.dish.id.cmp(&b.dish.id))
        });
        rejected.truncate(DEFAULT_ALTERNATIVES);
        outcome.alternatives = rejected;
    }

    outcome
}

fn classify(
    dish: &Dish,
    restrictions: &BTreeSet<DietaryClass>,
    allergens: &BTreeSet<Allergen>,
) -> Verdict {
    let mut missing_classes: BTreeSet<DietaryClass> = restrictions
        .difference(&dish.dietary_classes)
        .copied()
        .collect();

    // Offending ingredients split into fixable (substitute exists) and fixed
    let mut fixable: Vec<SubstitutionNote> = Vec::new();
    let mut fixed: BTreeSet<Allergen> = BTreeSet::new();
    for ingredient in dish.offending_ingredients(allergens) {
        if ingredient.has_substitute() {
            fixable.push(SubstitutionNote {
                ingredient: ingredient.name.clone(),
                substitutes: ingredient.substitutions.clone(),
            });
        } else if let Some(allergen) = ingredient.allergen {
            fixed.insert(allergen);
        }
    }

    // A declared class contradicted by a substitutable ingredient holds
    // only once the kitchen applies the swap: the dish satisfies the
    // matching restriction with modification, not as served.
    for class in restrictions.intersection(&dish.dietary_classes) {
        for ingredient in &dish.ingredients {
            let Some(allergen) = ingredient.allergen else {
                continue;
            };
            if !class.contradicting_allergens().contains(&allergen) {
                continue;
            }
            if ingredient.has_substitute() {
                if !fixable.iter().any(|note| note.ingredient == ingredient.name) {
                    fixable.push(SubstitutionNote {
                        ingredient: ingredient.name.clone(),
                        substitutes: ingredient.substitutions.clone(),
                    });
                }
            } else {
                missing_classes.insert(*class);
            }
        }
    }

    if !missing_classes.is_empty() || !fixed.is_empty() {
        return Verdict::Violating {
            restrictions: missing_classes,
            allergens: fixed,
        };
    }

    // Nominally compliant; cross-contamination still disqualifies "safe"
    let risk: BTreeSet<Allergen> = dish
        .cross_contamination
        .intersection(allergens)
        .copied()
        .collect();
    if !risk.is_empty() {
        return Verdict::RiskFlagged(risk);
    }

    if fixable.is_empty() {
        Verdict::Compliant
    } else {
        Verdict::Modifiable(fixable)
    }
}
