//! Caching decorator for dish catalogs.
//!
//! Wraps any `DishCatalog` with a read-through cache so per-dish lookups
//! during scoring do not hammer the underlying store. Consistency contract:
//! whoever mutates the underlying catalog must call `invalidate` (or
//! `invalidate_all`) for the affected dishes; `list_available` always hits
//! the source and refreshes the cache wholesale.

use async_trait::async_trait;
use maitre_core::dish::{Dish, DishCatalog};
use maitre_core::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-through cache over an inner catalog.
pub struct CachedDishCatalog {
    inner: Arc<dyn DishCatalog>,
    cache: RwLock<HashMap<String, Dish>>,
}

impl CachedDishCatalog {
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: Arc<dyn DishCatalog>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drops a single dish from the cache.
    pub async fn invalidate(&self, dish_id: &str) {
        let mut cache = self.cache.write().await;
        cache.remove(dish_id);
    }

    /// Drops every cached dish.
    pub async fn invalidate_all(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
    }

    /// Number of dishes currently cached.
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl DishCatalog for CachedDishCatalog {
    /// Always consults the source, then refreshes the cache with the
    /// returned snapshot so subsequent `get`s observe the same menu state.
    async fn list_available(&self) -> Result<Vec<Dish>> {
        let listed = self.inner.list_available().await?;
        let mut cache = self.cache.write().await;
        cache.clear();
        for dish in &listed {
            cache.insert(dish.id.clone(), dish.clone());
        }
        Ok(listed)
    }

    async fn get(&self, dish_id: &str) -> Result<Dish> {
        {
            let cache = self.cache.read().await;
            if let Some(dish) = cache.get(dish_id) {
                return Ok(dish.clone());
            }
        }

        tracing::debug!("dish cache miss: {}", dish_id);
        let dish = self.inner.get(dish_id).await?;
        let mut cache = self.cache.write().await;
        cache.insert(dish.id.clone(), dish.clone());
        Ok(dish)
    }
}
