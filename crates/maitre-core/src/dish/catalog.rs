//! Dish catalog trait.
//!
//! Defines the read-only interface to the external menu data store.

use super::model::Dish;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract read-only view of the available dishes.
///
/// This trait decouples the recommendation core from the menu store's
/// technology (in-memory fixture, file-backed catalog, remote service).
/// Implementations are expected to be cheap to call repeatedly; callers
/// that need stronger read locality can wrap an implementation in a
/// caching decorator.
#[async_trait]
pub trait DishCatalog: Send + Sync {
    /// Lists every dish currently marked available.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying store cannot be read;
    /// an empty menu is `Ok(vec![])`.
    async fn list_available(&self) -> Result<Vec<Dish>>;

    /// Fetches a single dish by its identifier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the dish does not exist.
    async fn get(&self, dish_id: &str) -> Result<Dish>;
}
