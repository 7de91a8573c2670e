//! Dish domain module.
//!
//! - `model`: dish entity, ingredients, allergen and dietary vocabularies
//! - `catalog`: read-only catalog trait implemented by the menu store

mod catalog;
mod model;

pub use catalog::DishCatalog;
pub use model::{
    AXIS_MAX, Allergen, DietaryClass, Dish, FlavorProfile, Ingredient, SPICE_MAX,
};
