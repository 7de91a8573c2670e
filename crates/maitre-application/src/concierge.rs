//! Concierge service.
//!
//! The application-layer facade the external query/API layer talks to. It
//! wires the session registry, context resolver, dietary filter, scoring
//! engine, and dish catalog together and enforces the boundary contract:
//! structured inputs in, structured results out, errors typed.

use maitre_core::context::{ContextResolver, ReferenceKind, ResolvedEntity};
use maitre_core::dish::{Allergen, DietaryClass, Dish, DishCatalog};
use maitre_core::error::Result;
use maitre_core::filter::{FilterOutcome, filter_dishes};
use maitre_core::group::{GroupOutcome, recommend_for_group};
use maitre_core::preference::{Customer, CustomerPreferences};
use maitre_core::scoring::{ScoringConfig, annotate_substitutions, recommend};
use maitre_core::session::{
    ArchiveRepository, HistoryEntry, QueryIntent, RegistryConfig, Session, SessionRegistry,
    SessionStatus,
};
use maitre_infrastructure::{CachedDishCatalog, DirArchiveRepository, InMemoryDishCatalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// A read-only view of a session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: String,
    pub table_id: String,
    pub status: SessionStatus,
    pub customers: Vec<Customer>,
    /// The most recent history entries, oldest first
    pub recent_history: Vec<HistoryEntry>,
    /// The dish a bare "it" would currently resolve to
    pub dish_in_focus: Option<String>,
    /// The customers the conversation last focused on
    pub customers_in_focus: Vec<String>,
}

/// How much history `get_context` returns.
const CONTEXT_HISTORY_TAIL: usize = 10;

impl SessionContext {
    fn from_session(session: Session) -> Self {
        let dish_in_focus = session.last_dish_discussed().map(str::to_string);
        let customers_in_focus = session
            .last_customer_focus()
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        let skip = session.history.len().saturating_sub(CONTEXT_HISTORY_TAIL);
        Self {
            session_id: session.id,
            table_id: session.table_id,
            status: session.status,
            customers: session.customers,
            recent_history: session.history.into_iter().skip(skip).collect(),
            dish_in_focus,
            customers_in_focus,
        }
    }
}

/// The application facade over the recommendation core.
pub struct ConciergeService {
    registry: Arc<SessionRegistry>,
    resolver: ContextResolver,
    archive: Arc<dyn ArchiveRepository>,
    catalog: Arc<dyn DishCatalog>,
    scoring: ScoringConfig,
}

impl ConciergeService {
    /// Wires a service from its collaborators.
    pub fn new(
        archive: Arc<dyn ArchiveRepository>,
        catalog: Arc<dyn DishCatalog>,
        registry_config: RegistryConfig,
        scoring: ScoringConfig,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(archive.clone(), registry_config));
        let resolver = ContextResolver::new(registry.clone());
        Self {
            registry,
            resolver,
            archive,
            catalog,
            scoring,
        }
    }

    /// Bootstraps a service with the stock infrastructure: a TOML archive
    /// under `archive_dir` and a cached in-memory menu catalog.
    ///
    /// Returns the service together with the catalog handle the menu
    /// administration side uses to manage dishes.
    pub async fn bootstrap(
        archive_dir: impl AsRef<Path>,
    ) -> Result<(Self, Arc<InMemoryDishCatalog>)> {
        let archive = Arc::new(DirArchiveRepository::new(archive_dir).await?);
        let menu = Arc::new(InMemoryDishCatalog::new());
        let catalog = Arc::new(CachedDishCatalog::new(menu.clone()));
        Ok((
            Self::new(
                archive,
                catalog,
                RegistryConfig::default(),
                ScoringConfig::default(),
            ),
            menu,
        ))
    }

    /// The registry handle, for the reaper scheduler.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Opens a session for a table. See `SessionRegistry::create`.
    pub async fn create_session(&self, table_id: &str, customer_count: usize) -> Result<Session> {
        let session = self.registry.create(table_id, customer_count).await?;
        tracing::info!(
            "Opened session {} for table {} ({} guests)",
            session.id,
            table_id,
            customer_count
        );
        Ok(session)
    }

    /// Ends a session, snapshotting it to the archive. Idempotent.
    pub async fn end_session(&self, session_id: &str) -> Result<()> {
        self.registry.end(session_id).await?;
        tracing::info!("Ended session {}", session_id);
        Ok(())
    }

    /// Stores a customer's preferences.
    pub async fn set_preference(
        &self,
        session_id: &str,
        customer_id: &str,
        preferences: CustomerPreferences,
    ) -> Result<()> {
        self.registry
            .set_preference(session_id, customer_id, preferences)
            .await
    }

    /// Seats an extra guest at an active table.
    pub async fn add_customer(&self, session_id: &str, customer: Customer) -> Result<()> {
        self.registry.add_customer(session_id, customer).await
    }

    /// Returns the session's current conversational context.
    ///
    /// Live and retained sessions come from the registry; sessions already
    /// evicted from memory are reconstructed from the archival record, so
    /// ending a session never makes its history unreadable.
    pub async fn get_context(&self, session_id: &str) -> Result<SessionContext> {
        match self.registry.get(session_id).await {
            Ok(session) => Ok(SessionContext::from_session(session)),
            Err(e) if e.is_not_found() => {
                let archived = self
                    .archive
                    .find_by_id(session_id)
                    .await?
                    .ok_or(e)?;
                Ok(SessionContext::from_session(archived))
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Context resolution
    // ========================================================================

    /// Resolves a tagged reference expression against session history.
    pub async fn resolve_reference(
        &self,
        session_id: &str,
        kind: ReferenceKind,
    ) -> Result<ResolvedEntity> {
        self.resolver.resolve(session_id, kind).await
    }

    /// Records a completed exchange so later references can resolve.
    pub async fn record_exchange(
        &self,
        session_id: &str,
        intent: QueryIntent,
        dishes_in_focus: Vec<String>,
        customers_in_focus: Vec<String>,
    ) -> Result<()> {
        self.resolver
            .record_exchange(session_id, intent, dishes_in_focus, customers_in_focus)
            .await
    }

    // ========================================================================
    // Filtering and ranking
    // ========================================================================

    /// Pure dietary/allergen filter over an explicit dish set.
    pub fn filter_by_restrictions(
        &self,
        dishes: &[Dish],
        restrictions: &BTreeSet<DietaryClass>,
        allergens: &BTreeSet<Allergen>,
    ) -> FilterOutcome {
        filter_dishes(dishes, restrictions, allergens)
    }

    /// Filters then ranks an explicit dish set for one customer.
    ///
    /// Dishes compliant with modification participate in the ranking; when
    /// nothing complies the outcome carries the closest alternatives
    /// instead of an empty list.
    pub fn recommend(
        &self,
        preferences: &CustomerPreferences,
        dishes: &[Dish],
        count: usize,
    ) -> GroupOutcome {
        let filtered = filter_dishes(
            dishes,
            &preferences.dietary_restrictions,
            &preferences.allergens,
        );
        if filtered.has_no_compliant() {
            return GroupOutcome {
                recommendations: Vec::new(),
                alternatives: filtered.alternatives,
                risk_flagged: filtered.risk_flagged,
            };
        }
        let mut recommendations = recommend(
            &filtered.rankable_dishes(),
            preferences,
            count,
            &self.scoring,
        );
        annotate_substitutions(&mut recommendations, &filtered.modifiable);
        GroupOutcome {
            recommendations,
            alternatives: Vec::new(),
            risk_flagged: filtered.risk_flagged,
        }
    }

    /// Filters then ranks the current menu for one customer.
    pub async fn recommend_from_menu(
        &self,
        preferences: &CustomerPreferences,
        count: usize,
    ) -> Result<GroupOutcome> {
        let menu = self.catalog.list_available().await?;
        Ok(self.recommend(preferences, &menu, count))
    }

    /// Group-safe, group-ranked recommendations over an explicit dish set.
    pub fn recommend_for_group(
        &self,
        preferences: &[CustomerPreferences],
        dishes: &[Dish],
        count: usize,
    ) -> GroupOutcome {
        recommend_for_group(preferences, dishes, count, &self.scoring)
    }

    /// Group recommendations over the current menu, using every seated
    /// customer's stored preferences.
    pub async fn recommend_for_table(&self, session_id: &str, count: usize) -> Result<GroupOutcome> {
        let session = self.registry.get(session_id).await?;
        let menu = self.catalog.list_available().await?;
        let preferences: Vec<CustomerPreferences> = session
            .customers
            .iter()
            .map(|c| c.preferences.clone())
            .collect();
        Ok(self.recommend_for_group(&preferences, &menu, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maitre_core::dish::{FlavorProfile, Ingredient};
    use tempfile::TempDir;

    fn dish(id: &str, classes: &[DietaryClass], spice_level: u8) -> Dish {
        Dish {
            id: id.to_string(),
            name: id.to_string(),
            cuisine: "thai".to_string(),
            ingredients: vec![],
            flavor: FlavorProfile::neutral(),
            spice_level,
            dietary_classes: classes.iter().copied().collect(),
            cross_contamination: BTreeSet::new(),
            available: true,
            popular: false,
        }
    }

    async fn service() -> (ConciergeService, Arc<InMemoryDishCatalog>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let (service, menu) = ConciergeService::bootstrap(temp_dir.path()).await.unwrap();
        (service, menu, temp_dir)
    }

    #[tokio::test]
    async fn full_table_service_flow() {
        let (service, menu, _guard) = service().await;
        menu.upsert(dish("green_curry", &[DietaryClass::Vegan], 6))
            .await
            .unwrap();
        menu.upsert(dish("pad_thai", &[], 3)).await.unwrap();

        let session = service.create_session("table-9", 2).await.unwrap();

        service
            .set_preference(
                &session.id,
                "guest-1",
                CustomerPreferences {
                    dietary_restrictions: [DietaryClass::Vegan].into_iter().collect(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        service
            .record_exchange(
                &session.id,
                QueryIntent::Information,
                vec!["green_curry".to_string()],
                vec!["guest-1".to_string()],
            )
            .await
            .unwrap();

        // "is it spicy?" resolves against the recorded exchange
        let resolved = service
            .resolve_reference(&session.id, ReferenceKind::LastDish)
            .await
            .unwrap();
        assert_eq!(resolved, ResolvedEntity::Dish("green_curry".to_string()));

        // Group recommendation honors guest-1's vegan restriction
        let outcome = service.recommend_for_table(&session.id, 3).await.unwrap();
        let ids: Vec<&str> = outcome
            .recommendations
            .iter()
            .map(|r| r.dish_id.as_str())
            .collect();
        assert_eq!(ids, vec!["green_curry"]);

        let context = service.get_context(&session.id).await.unwrap();
        assert_eq!(context.dish_in_focus.as_deref(), Some("green_curry"));
        assert_eq!(context.customers_in_focus, vec!["guest-1".to_string()]);
    }

    #[tokio::test]
    async fn archived_context_stays_readable_through_the_archive() {
        let (service, _menu, _guard) = service().await;

        let session = service.create_session("table-1", 1).await.unwrap();
        service
            .record_exchange(
                &session.id,
                QueryIntent::Allergen,
                vec!["satay".to_string()],
                vec![],
            )
            .await
            .unwrap();
        service.end_session(&session.id).await.unwrap();

        // Mutation is rejected...
        let err = service
            .set_preference(&session.id, "guest-1", CustomerPreferences::default())
            .await
            .unwrap_err();
        assert!(err.is_invalid_state());

        // ...but the context stays readable, even after memory eviction
        let far_future = chrono::Utc::now() + chrono::Duration::days(1);
        service.registry().evict_archived(far_future).await;

        let context = service.get_context(&session.id).await.unwrap();
        assert_eq!(context.status, SessionStatus::Archived);
        assert_eq!(context.recent_history.len(), 1);
        assert_eq!(context.dish_in_focus.as_deref(), Some("satay"));
    }

    #[tokio::test]
    async fn recommend_surfaces_alternatives_when_nothing_complies() {
        let (service, _menu, _guard) = service().await;

        let mut shrimp = dish("shrimp_toast", &[], 2);
        shrimp.ingredients.push(Ingredient {
            name: "shrimp".to_string(),
            allergen: Some(Allergen::Shellfish),
            substitutable: false,
            substitutions: vec![],
        });

        let preferences = CustomerPreferences {
            allergens: [Allergen::Shellfish].into_iter().collect(),
            ..Default::default()
        };
        let outcome = service.recommend(&preferences, std::slice::from_ref(&shrimp), 3);
        assert!(outcome.recommendations.is_empty());
        assert_eq!(outcome.alternatives.len(), 1);
        assert_eq!(outcome.alternatives[0].dish.id, "shrimp_toast");
    }

    #[tokio::test]
    async fn recommendations_flag_dishes_needing_substitution() {
        let (service, _menu, _guard) = service().await;

        let mut caesar = dish("caesar_salad", &[], 2);
        caesar.ingredients.push(Ingredient {
            name: "parmesan".to_string(),
            allergen: Some(Allergen::Dairy),
            substitutable: true,
            substitutions: vec!["nutritional yeast".to_string()],
        });

        let preferences = CustomerPreferences {
            allergens: [Allergen::Dairy].into_iter().collect(),
            ..Default::default()
        };
        let outcome = service.recommend(&preferences, std::slice::from_ref(&caesar), 3);
        assert_eq!(outcome.recommendations.len(), 1);
        assert_eq!(
            outcome.recommendations[0].substitutions[0].ingredient,
            "parmesan"
        );
        assert!(
            outcome.recommendations[0]
                .reasons
                .contains(&maitre_core::scoring::ReasonTag::RequiresModification)
        );
    }

    #[tokio::test]
    async fn unknown_session_context_is_not_found() {
        let (service, _menu, _guard) = service().await;
        let err = service.get_context("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
