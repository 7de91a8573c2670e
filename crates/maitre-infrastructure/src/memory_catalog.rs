//! In-memory dish catalog.
//!
//! Backs the `DishCatalog` trait with a lock-guarded map. Useful as the
//! fixture catalog in tests and as the menu store for single-process
//! deployments; larger deployments implement the trait over their own
//! menu service.

use async_trait::async_trait;
use maitre_core::dish::{Dish, DishCatalog};
use maitre_core::error::{MaitreError, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Map-backed catalog.
pub struct InMemoryDishCatalog {
    dishes: RwLock<HashMap<String, Dish>>,
}

impl InMemoryDishCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            dishes: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces a dish after validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the dish fails validation.
    pub async fn upsert(&self, dish: Dish) -> Result<()> {
        dish.validate()?;
        let mut dishes = self.dishes.write().await;
        dishes.insert(dish.id.clone(), dish);
        Ok(())
    }

    /// Removes a dish. Removing a missing dish is not an error.
    pub async fn remove(&self, dish_id: &str) {
        let mut dishes = self.dishes.write().await;
        dishes.remove(dish_id);
    }

    /// Flips a dish's availability flag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown dish.
    pub async fn set_available(&self, dish_id: &str, available: bool) -> Result<()> {
        let mut dishes = self.dishes.write().await;
        let dish = dishes
            .get_mut(dish_id)
            .ok_or_else(|| MaitreError::not_found("dish", dish_id))?;
        dish.available = available;
        Ok(())
    }
}

impl Default for InMemoryDishCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DishCatalog for InMemoryDishCatalog {
    async fn list_available(&self) -> Result<Vec<Dish>> {
        let dishes = self.dishes.read().await;
        let mut available: Vec<Dish> = dishes.values().filter(|d| d.available).cloned().collect();
        available.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(available)
    }

    async fn get(&self, dish_id: &str) -> Result<Dish> {
        let dishes = self.dishes.read().await;
        dishes
            .get(dish_id)
            .cloned()
            .ok_or_else(|| MaitreError::not_found("dish", dish_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maitre_core::dish::FlavorProfile;
    use std::collections::BTreeSet;

    fn dish(id: &str) -> Dish {
        Dish {
            id: id.to_string(),
            name: id.to_string(),
            cuisine: "test".to_string(),
            ingredients: vec![],
            flavor: FlavorProfile::neutral(),
            spice_level: 3,
            dietary_classes: BTreeSet::new(),
            cross_contamination: BTreeSet::new(),
            available: true,
            popular: false,
        }
    }

    #[tokio::test]
    async fn upsert_get_and_availability() {
        let catalog = InMemoryDishCatalog::new();
        catalog.upsert(dish("pho")).await.unwrap();
        catalog.upsert(dish("banh_mi")).await.unwrap();

        assert_eq!(catalog.get("pho").await.unwrap().id, "pho");
        assert!(catalog.get("missing").await.unwrap_err().is_not_found());

        catalog.set_available("pho", false).await.unwrap();
        let listed = catalog.list_available().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "banh_mi");
    }

    #[tokio::test]
    async fn upsert_rejects_invalid_dishes() {
        let catalog = InMemoryDishCatalog::new();
        let mut bad = dish("too_hot");
        bad.spice_level = 42;
        assert!(catalog.upsert(bad).await.unwrap_err().is_invalid_argument());
    }
}
