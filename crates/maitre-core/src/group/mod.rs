//! Group accommodation resolver.
//!
//! Combines per-customer filters and scores into group-safe, group-ranked
//! results. A dish is eligible for sharing only when it is safe as served
//! for every member, and its group score is the minimum of the members'
//! individual scores: a shared dish is only as good as its worst-fit diner.

use crate::dish::Dish;
use crate::filter::{AlternativeDish, DEFAULT_ALTERNATIVES, RiskFlaggedDish, filter_dishes};
use crate::preference::CustomerPreferences;
use crate::scoring::{
    Recommendation, ScoringConfig, annotate_substitutions, recommend, score_dish, sort_ranked,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Group recommendation outcome.
///
/// When no dish is safe for every member, `recommendations` is empty and
/// `alternatives` carries the dishes with the fewest violated constraints
/// summed across the whole group, mirroring the single-customer filter's
/// closest-alternatives contract. Dishes at cross-contamination risk for
/// any member are surfaced in `risk_flagged` with the union of the risky
/// allergens, never as safe results or unmarked alternatives.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupOutcome {
    pub recommendations: Vec<Recommendation>,
    pub alternatives: Vec<AlternativeDish>,
    #[serde(default)]
    pub risk_flagged: Vec<RiskFlaggedDish>,
}

/// Ranks dishes for a whole table.
///
/// First intersects the per-customer compliant sets (strictly safe as
/// served; dishes needing per-person modification are not shareable), then
/// scores each eligible dish per member and ranks by the minimum member
/// score, with the same tie-break rule as the single-customer engine. The
/// surviving recommendation carries the worst-fit member's factor
/// breakdown, since that member's fit is what the group score reflects.
pub fn recommend_for_group(
    preferences: &[CustomerPreferences],
    dishes: &[Dish],
    count: usize,
    config: &ScoringConfig,
) -> GroupOutcome {
    if preferences.is_empty() {
        return GroupOutcome::default();
    }
    if let [single] = preferences {
        let outcome = filter_dishes(
            dishes,
            &single.dietary_restrictions,
            &single.allergens,
        );
        if outcome.has_no_compliant() {
            return GroupOutcome {
                recommendations: Vec::new(),
                alternatives: outcome.alternatives,
                risk_flagged: outcome.risk_flagged,
            };
        }
        let mut recommendations = recommend(&outcome.rankable_dishes(), single, count, config);
        annotate_substitutions(&mut recommendations, &outcome.modifiable);
        return GroupOutcome {
            recommendations,
            alternatives: Vec::new(),
            risk_flagged: outcome.risk_flagged,
        };
    }

    let per_member: Vec<_> = preferences
        .iter()
        .map(|member| filter_dishes(dishes, &member.dietary_restrictions, &member.allergens))
        .collect();

    // One warning per dish, with the risky allergens merged across members
    let mut flagged: BTreeMap<String, RiskFlaggedDish> = BTreeMap::new();
    for outcome in &per_member {
        for risk in &outcome.risk_flagged {
            flagged
                .entry(risk.dish.id.clone())
                .and_modify(|existing| {
                    existing
                        .risk_allergens
                        .extend(risk.risk_allergens.iter().copied());
                })
                .or_insert_with(|| risk.clone());
        }
    }
    let risk_flagged: Vec<RiskFlaggedDish> = flagged.into_values().collect();

    // Shareable = safe-as-served for every member
    let mut eligible_ids: BTreeSet<String> = per_member[0]
        .compliant
        .iter()
        .map(|dish| dish.id.clone())
        .collect();
    for outcome in &per_member[1..] {
        let member_ids: BTreeSet<String> = outcome
            .compliant
            .iter()
            .map(|dish| dish.id.clone())
            .collect();
        eligible_ids = eligible_ids.intersection(&member_ids).cloned().collect();
    }

    if eligible_ids.is_empty() {
        return GroupOutcome {
            recommendations: Vec::new(),
            alternatives: joint_alternatives(dishes, preferences),
            risk_flagged,
        };
    }

    let mut ranked: Vec<Recommendation> = dishes
        .iter()
        .filter(|dish| eligible_ids.contains(&dish.id))
        .filter_map(|dish| {
            preferences
                .iter()
                .map(|member| score_dish(dish, member, config))
                .reduce(|worst, next| if next.score < worst.score { next } else { worst })
        })
        .collect();

    sort_ranked(&mut ranked);
    ranked.truncate(count);

    GroupOutcome {
        recommendations: ranked,
        alternatives: Vec::new(),
        risk_flagged,
    }
}

/// Closest alternatives computed jointly: violations are summed over every
/// member's constraint set, lower totals first.
fn joint_alternatives(
    dishes: &[Dish],
    preferences: &[CustomerPreferences],
) -> Vec<AlternativeDish> {
    let mut joint: Vec<AlternativeDish> = Vec::new();

    for dish in dishes.iter().filter(|d| d.available) {
        let mut violations = 0;
        let mut violated_restrictions = BTreeSet::new();
        let mut violated_allergens = BTreeSet::new();

        let risk_hit = preferences
            .iter()
            .any(|member| !dish.cross_contamination.is_disjoint(&member.allergens));

        for member in preferences {
            let missing = member
                .dietary_restrictions
                .difference(&dish.dietary_classes)
                .copied();
            for class in missing {
                violations += 1;
                violated_restrictions.insert(class);
            }
            for ingredient in dish.offending_ingredients(&member.allergens) {
                if !ingredient.has_substitute() {
                    if let Some(allergen) = ingredient.allergen {
                        violations += 1;
                        violated_allergens.insert(allergen);
                    }
                }
            }
        }

        // Dishes failing only on cross-contamination belong in the
        // risk-flagged warnings, not the alternatives
        if violations == 0 && risk_hit {
            continue;
        }

        joint.push(AlternativeDish {
            dish: dish.clone(),
            violations,
            violated_restrictions,
            violated_allergens,
        });
    }

    joint.sort_by(|a, b| {
        a.violations
            .cmp(&b.violations)
            .then_with(|| a.dish.id.cmp(&b.dish.id))
    });
    joint.truncate(DEFAULT_ALTERNATIVES);
    joint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dish::{Allergen, DietaryClass, FlavorProfile, Ingredient};
    use crate::scoring::ReasonTag;

    fn dish(id: &str, classes: &[DietaryClass], spice_level: u8) -> Dish {
        Dish {
            id: id.to_string(),
            name: id.to_string(),
            cuisine: "test".to_string(),
            ingredients: vec![],
            flavor: FlavorProfile::neutral(),
            spice_level,
            dietary_classes: classes.iter().copied().collect(),
            cross_contamination: BTreeSet::new(),
            available: true,
            popular: false,
        }
    }

    fn member(restrictions: &[DietaryClass], spice_tolerance: u8) -> CustomerPreferences {
        CustomerPreferences {
            dietary_restrictions: restrictions.iter().copied().collect(),
            spice_tolerance,
            ..Default::default()
        }
    }

    #[test]
    fn only_dishes_safe_for_every_member_are_shareable() {
        let dishes = vec![
            dish("tofu_curry", &[DietaryClass::Vegan, DietaryClass::Vegetarian], 4),
            dish("carbonara", &[], 2),
        ];
        let group = vec![member(&[DietaryClass::Vegan], 5), member(&[], 5)];

        let outcome = recommend_for_group(&group, &dishes, 5, &ScoringConfig::default());
        let ids: Vec<&str> = outcome
            .recommendations
            .iter()
            .map(|r| r.dish_id.as_str())
            .collect();
        assert_eq!(ids, vec!["tofu_curry"]);
        assert!(outcome.alternatives.is_empty());
    }

    #[test]
    fn group_score_is_the_worst_member_fit() {
        // "crowd_pleaser" suits both; "firecracker" delights the chili-head
        // but overwhelms the mild member
        let dishes = vec![dish("crowd_pleaser", &[], 4), dish("firecracker", &[], 9)];
        let group = vec![member(&[], 9), member(&[], 3)];

        let outcome = recommend_for_group(&group, &dishes, 2, &ScoringConfig::default());
        assert_eq!(outcome.recommendations[0].dish_id, "crowd_pleaser");

        let config = ScoringConfig::default();
        let expected_min = group
            .iter()
            .map(|m| score_dish(&dishes[1], m, &config).score)
            .fold(f32::INFINITY, f32::min);
        let firecracker = outcome
            .recommendations
            .iter()
            .find(|r| r.dish_id == "firecracker")
            .unwrap();
        assert!((firecracker.score - expected_min).abs() < 1e-6);
    }

    #[test]
    fn empty_intersection_returns_joint_alternatives_not_a_panic() {
        let mut shrimp_only = dish("shrimp_platter", &[], 3);
        shrimp_only.ingredients.push(Ingredient {
            name: "shrimp".to_string(),
            allergen: Some(Allergen::Shellfish),
            substitutable: false,
            substitutions: vec![],
        });
        let dishes = vec![shrimp_only, dish("gluten_bomb", &[], 3)];

        let group = vec![
            member(&[DietaryClass::Vegan], 5),
            CustomerPreferences {
                allergens: [Allergen::Shellfish].into_iter().collect(),
                ..Default::default()
            },
        ];

        let outcome = recommend_for_group(&group, &dishes, 3, &ScoringConfig::default());
        assert!(outcome.recommendations.is_empty());
        assert!(!outcome.alternatives.is_empty());
        // gluten_bomb violates one constraint (vegan), shrimp_platter two
        assert_eq!(outcome.alternatives[0].dish.id, "gluten_bomb");
        assert_eq!(outcome.alternatives[0].violations, 1);
        assert_eq!(outcome.alternatives[1].violations, 2);
    }

    #[test]
    fn cross_contamination_risks_are_warnings_not_alternatives() {
        let mut fries = dish("fries", &[], 3);
        fries.cross_contamination.insert(Allergen::Shellfish);
        let dishes = vec![fries];

        let group = vec![
            CustomerPreferences {
                allergens: [Allergen::Shellfish].into_iter().collect(),
                ..Default::default()
            },
            member(&[], 5),
        ];

        let outcome = recommend_for_group(&group, &dishes, 3, &ScoringConfig::default());
        assert!(outcome.recommendations.is_empty());
        // The risky dish carries an explicit warning instead of posing as
        // a zero-violation alternative
        assert!(outcome.alternatives.is_empty());
        assert_eq!(outcome.risk_flagged.len(), 1);
        assert_eq!(outcome.risk_flagged[0].dish.id, "fries");
        assert!(
            outcome.risk_flagged[0]
                .risk_allergens
                .contains(&Allergen::Shellfish)
        );
    }

    #[test]
    fn single_member_rankings_carry_required_substitutions() {
        let mut caesar = dish("caesar_salad", &[], 2);
        caesar.ingredients.push(Ingredient {
            name: "parmesan".to_string(),
            allergen: Some(Allergen::Dairy),
            substitutable: true,
            substitutions: vec!["nutritional yeast".to_string()],
        });
        let dishes = vec![caesar, dish("fruit_plate", &[], 1)];

        let group = vec![CustomerPreferences {
            allergens: [Allergen::Dairy].into_iter().collect(),
            ..Default::default()
        }];

        let outcome = recommend_for_group(&group, &dishes, 3, &ScoringConfig::default());
        let caesar_rec = outcome
            .recommendations
            .iter()
            .find(|r| r.dish_id == "caesar_salad")
            .unwrap();
        assert_eq!(caesar_rec.substitutions[0].ingredient, "parmesan");
        assert!(caesar_rec.reasons.contains(&ReasonTag::RequiresModification));

        let fruit = outcome
            .recommendations
            .iter()
            .find(|r| r.dish_id == "fruit_plate")
            .unwrap();
        assert!(fruit.substitutions.is_empty());
    }

    #[test]
    fn single_member_group_degenerates_to_individual_ranking() {
        let dishes = vec![
            dish("vegan_bowl", &[DietaryClass::Vegan], 5),
            dish("steak", &[], 5),
        ];
        let group = vec![member(&[DietaryClass::Vegan], 5)];

        let outcome = recommend_for_group(&group, &dishes, 3, &ScoringConfig::default());
        let ids: Vec<&str> = outcome
            .recommendations
            .iter()
            .map(|r| r.dish_id.as_str())
            .collect();
        assert_eq!(ids, vec!["vegan_bowl"]);
    }

    #[test]
    fn group_ranking_ties_break_deterministically() {
        let dishes = vec![dish("beta", &[], 5), dish("alpha", &[], 5)];
        let group = vec![member(&[], 5), member(&[], 5)];

        let outcome = recommend_for_group(&group, &dishes, 2, &ScoringConfig::default());
        assert_eq!(outcome.recommendations[0].dish_id, "alpha");
    }
}
