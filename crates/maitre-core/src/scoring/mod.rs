//! Scoring and ranking engine.
//!
//! Pure functions from (dish set, preferences) to ordered, explained
//! recommendations. The score is a weighted sum of four normalized
//! sub-scores; every recommendation carries the per-factor contributions
//! so the presentation layer never re-derives the math.
//!
//! Metric choices (monotonic and symmetric, per the ordering properties the
//! tests pin down):
//! - flavor similarity: one minus Euclidean distance over the seven axes,
//!   normalized by the maximum possible distance
//! - spice mismatch: linear decay per point of difference, with dishes
//!   above tolerance decaying at twice the rate of dishes below it

use crate::dish::{AXIS_MAX, Dish, SPICE_MAX};
use crate::filter::{ModifiableDish, SubstitutionNote};
use crate::preference::CustomerPreferences;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::Display;

/// Weights and tunables for the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub flavor_weight: f32,
    pub familiarity_weight: f32,
    pub spice_weight: f32,
    pub novelty_weight: f32,
    /// Familiarity sub-score for cuisines outside the customer's set.
    /// Non-zero so novel cuisines are never excluded outright.
    pub familiarity_base: f32,
    /// How much faster the spice sub-score decays above tolerance than
    /// below it
    pub over_tolerance_penalty: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            flavor_weight: 0.40,
            familiarity_weight: 0.25,
            spice_weight: 0.20,
            novelty_weight: 0.15,
            familiarity_base: 0.3,
            over_tolerance_penalty: 2.0,
        }
    }
}

/// The four independent match factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchFactor {
    FlavorSimilarity,
    CuisineFamiliarity,
    SpiceMatch,
    Novelty,
}

/// One factor's share of a recommendation's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: MatchFactor,
    /// Configured weight of the factor
    pub weight: f32,
    /// Normalized sub-score in `0.0..=1.0`
    pub value: f32,
    /// `weight * value`
    pub contribution: f32,
}

/// Structured explanation tokens for the presentation layer to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReasonTag {
    FlavorMatch,
    FamiliarCuisine,
    NovelCuisine,
    SpiceOnTarget,
    SpiceAboveTolerance,
    SpiceBelowTolerance,
    AdventurousPick,
    RequiresModification,
}

/// A ranked, explained recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub dish_id: String,
    pub dish_name: String,
    /// Total weighted score in `0.0..=1.0`
    pub score: f32,
    /// Per-factor contributions, in factor declaration order
    pub factors: Vec<FactorContribution>,
    /// Explanation tokens, not prose
    pub reasons: Vec<ReasonTag>,
    /// Substitutions the kitchen must apply for the dish to comply;
    /// empty when the dish is safe as served
    #[serde(default)]
    pub substitutions: Vec<SubstitutionNote>,
}

impl Recommendation {
    /// The flavor-similarity sub-score, used as the first tie-breaker.
    fn flavor_value(&self) -> f32 {
        self.factors
            .iter()
            .find(|f| f.factor == MatchFactor::FlavorSimilarity)
            .map(|f| f.value)
            .unwrap_or(0.0)
    }
}

/// Scores a single dish against one customer's preferences.
pub fn score_dish(
    dish: &Dish,
    preferences: &CustomerPreferences,
    config: &ScoringConfig,
) -> Recommendation {
    let flavor = flavor_similarity(dish, preferences);
    let familiar = preferences.is_familiar_with(&dish.cuisine);
    let familiarity = if familiar {
        1.0
    } else {
        config.familiarity_base
    };
    let spice = spice_match(dish, preferences, config);
    // Novelty rewards unfamiliar cuisines in proportion to adventurousness
    let novelty = if familiar {
        0.0
    } else {
        preferences.adventurousness
    };

    let factors = vec![
        contribution(MatchFactor::FlavorSimilarity, config.flavor_weight, flavor),
        contribution(
            MatchFactor::CuisineFamiliarity,
            config.familiarity_weight,
            familiarity,
        ),
        contribution(MatchFactor::SpiceMatch, config.spice_weight, spice),
        contribution(MatchFactor::Novelty, config.novelty_weight, novelty),
    ];
    let score = factors.iter().map(|f| f.contribution).sum();

    let mut reasons = Vec::new();
    if flavor >= 0.75 {
        reasons.push(ReasonTag::FlavorMatch);
    }
    reasons.push(if familiar {
        ReasonTag::FamiliarCuisine
    } else {
        ReasonTag::NovelCuisine
    });
    match dish.spice_level.cmp(&preferences.spice_tolerance) {
        Ordering::Equal => reasons.push(ReasonTag::SpiceOnTarget),
        Ordering::Greater => reasons.push(ReasonTag::SpiceAboveTolerance),
        Ordering::Less => reasons.push(ReasonTag::SpiceBelowTolerance),
    }
    if !familiar && novelty * config.novelty_weight > 0.05 {
        reasons.push(ReasonTag::AdventurousPick);
    }

    Recommendation {
        dish_id: dish.id.clone(),
        dish_name: dish.name.clone(),
        score,
        factors,
        reasons,
        substitutions: Vec::new(),
    }
}

/// Marks ranked dishes that comply only with a kitchen modification,
/// attaching the required substitutions from the filter pass.
pub fn annotate_substitutions(ranked: &mut [Recommendation], modifiable: &[ModifiableDish]) {
    for rec in ranked.iter_mut() {
        if let Some(entry) = modifiable.iter().find(|m| m.dish.id == rec.dish_id) {
            rec.substitutions = entry.substitutions.clone();
            rec.reasons.push(ReasonTag::RequiresModification);
        }
    }
}

/// Ranks a dish set for one customer.
///
/// Sorted descending by total score; ties broken by higher flavor
/// sub-score, then lexicographic dish id, for determinism. Returns
/// `min(count, dishes.len())` recommendations; fewer available dishes is
/// not an error.
pub fn recommend(
    dishes: &[Dish],
    preferences: &CustomerPreferences,
    count: usize,
    config: &ScoringConfig,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = dishes
        .iter()
        .map(|dish| score_dish(dish, preferences, config))
        .collect();
    sort_ranked(&mut ranked);
    ranked.truncate(count);
    ranked
}

/// The shared ranking order: score desc, flavor sub-score desc, dish id asc.
pub(crate) fn sort_ranked(ranked: &mut [Recommendation]) {
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.flavor_value().total_cmp(&a.flavor_value()))
            .then_with(|| a.dish_id.cmp(&b.dish_id))
    });
}

fn contribution(factor: MatchFactor, weight: f32, value: f32) -> FactorContribution {
    FactorContribution {
        factor,
        weight,
        value,
        contribution: weight * value,
    }
}

/// One minus the normalized Euclidean distance between the dish's flavor
/// vector and the preference vector.
fn flavor_similarity(dish: &Dish, preferences: &CustomerPreferences) -> f32 {
    let dish_axes = dish.flavor.as_array();
    let pref_axes = preferences.flavor.as_array();
    let squared: f32 = dish_axes
        .iter()
        .zip(pref_axes.iter())
        .map(|(d, p)| (d - p) * (d - p))
        .sum();
    let max_distance = (dish_axes.len() as f32).sqrt() * AXIS_MAX;
    1.0 - squared.sqrt() / max_distance
}

/// 1.0 at exact tolerance match, linear decay with distance; exceeding
/// tolerance decays `over_tolerance_penalty` times faster than staying
/// below it.
fn spice_match(dish: &Dish, preferences: &CustomerPreferences, config: &ScoringConfig) -> f32 {
    let diff = dish.spice_level as f32 - preferences.spice_tolerance as f32;
    let step = 1.0 / SPICE_MAX as f32;
    let decay = if diff > 0.0 {
        diff * step * config.over_tolerance_penalty
    } else {
        -diff * step
    };
    (1.0 - decay).clamp(0.0, 1.0)
}
