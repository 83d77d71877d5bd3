//! Recommendation entry points used by the HTTP and CLI surfaces

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::classifier::build_upgrade_list;
use super::scorer::CoOccurrenceScorer;
use super::types::*;
use crate::catalog::CatalogReader;
use crate::events::ViewEventStore;

#[derive(Debug, Clone)]
pub struct RecommendationService<S, C> {
    scorer: CoOccurrenceScorer<S, C>,
    defaults: ScoringParams,
}

impl<S, C> RecommendationService<S, C>
where
    S: ViewEventStore,
    C: CatalogReader,
{
    pub fn new(store: S, catalog: C, defaults: ScoringParams) -> Self {
        Self { scorer: CoOccurrenceScorer::new(store, catalog), defaults }
    }

    pub fn defaults(&self) -> ScoringParams {
        self.defaults
    }

    pub fn scorer(&self) -> &CoOccurrenceScorer<S, C> {
        &self.scorer
    }

    /// "Also viewed" for a single product page. Out-of-stock parts are kept.
    pub async fn also_viewed(
        &self,
        slug: &str,
        params: Option<ScoringParams>,
    ) -> Vec<ScoredCandidate> {
        let params = params.unwrap_or(self.defaults);
        self.scorer
            .score_related(&[slug.to_owned()], params, RecommendationContext::AlsoViewed)
            .await
    }

    /// Suggestions for everything currently in a cart or build. Only in-stock parts.
    pub async fn for_cart(
        &self,
        slugs: &[String],
        params: Option<ScoringParams>,
    ) -> Vec<ScoredCandidate> {
        let params = params.unwrap_or(self.defaults);
        self.scorer.score_related(slugs, params, RecommendationContext::Cart).await
    }

    pub async fn upgrades(&self, slug: &str, params: Option<ScoringParams>) -> UpgradeList {
        self.upgrades_at(slug, params.unwrap_or(self.defaults), Utc::now()).await
    }

    pub async fn upgrades_at(
        &self,
        slug: &str,
        params: ScoringParams,
        now: DateTime<Utc>,
    ) -> UpgradeList {
        let catalog = self.scorer.catalog();

        let base = match catalog.find_by_slug(slug.trim()).await {
            Ok(Some(base)) => base,
            Ok(None) => {
                info!(
                    event_name = "recommendations.upgrades.unknown_base",
                    product_slug = %slug,
                    "base product not found in catalog"
                );
                return UpgradeList::default();
            }
            Err(error) => {
                warn!(
                    event_name = "recommendations.upgrades.catalog_failed",
                    product_slug = %slug,
                    error = %error,
                    "catalog lookup failed; returning no upgrades"
                );
                return UpgradeList::default();
            }
        };

        let (bonus, parts) = tokio::join!(
            self.scorer.co_occurrence_counts(&base.slug, params, now),
            catalog.list_all(),
        );

        let bonus = match bonus {
            Ok(bonus) => bonus,
            Err(error) => {
                warn!(
                    event_name = "recommendations.upgrades.store_failed",
                    product_slug = %base.slug,
                    error = %error,
                    "co-occurrence counts unavailable; returning no upgrades"
                );
                return UpgradeList::default();
            }
        };
        let parts = match parts {
            Ok(parts) => parts,
            Err(error) => {
                warn!(
                    event_name = "recommendations.upgrades.catalog_failed",
                    product_slug = %base.slug,
                    error = %error,
                    "catalog listing failed; returning no upgrades"
                );
                return UpgradeList::default();
            }
        };

        build_upgrade_list(&base, &parts, &bonus)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use tokio::sync::RwLock;

    use super::*;
    use crate::catalog::{CatalogError, InMemoryCatalog};
    use crate::domain::part::{Part, PartCategory, PartId, PartSpecs};
    use crate::domain::view_event::{CoOccurrenceGrouping, CoOccurringView, ViewEvent};
    use crate::events::EventStoreError;

    #[derive(Default)]
    struct SessionOnlyStore {
        events: RwLock<Vec<ViewEvent>>,
    }

    #[async_trait]
    impl ViewEventStore for SessionOnlyStore {
        async fn append(&self, event: ViewEvent) -> Result<(), EventStoreError> {
            self.events.write().await.push(event);
            Ok(())
        }

        async fn co_occurring(
            &self,
            anchor_slugs: &[String],
            since: DateTime<Utc>,
            until: DateTime<Utc>,
            group_by: CoOccurrenceGrouping,
        ) -> Result<Vec<CoOccurringView>, EventStoreError> {
            if group_by == CoOccurrenceGrouping::Identity {
                return Ok(Vec::new());
            }
            let events = self.events.read().await;
            let sessions: HashSet<&str> = events
                .iter()
                .filter(|e| (since..=until).contains(&e.viewed_at))
                .filter(|e| anchor_slugs.contains(&e.slug))
                .map(|e| e.session_id.as_str())
                .collect();
            Ok(events
                .iter()
                .filter(|e| (since..=until).contains(&e.viewed_at))
                .filter(|e| !anchor_slugs.contains(&e.slug))
                .filter(|e| sessions.contains(e.session_id.as_str()))
                .map(|e| CoOccurringView { slug: e.slug.clone(), viewed_at: e.viewed_at })
                .collect())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl CatalogReader for BrokenCatalog {
        async fn find_by_slug(&self, _slug: &str) -> Result<Option<Part>, CatalogError> {
            Err(CatalogError::Unavailable("pool closed".to_owned()))
        }

        async fn find_by_category(
            &self,
            _category: PartCategory,
        ) -> Result<Vec<Part>, CatalogError> {
            Err(CatalogError::Unavailable("pool closed".to_owned()))
        }

        async fn list_all(&self) -> Result<Vec<Part>, CatalogError> {
            Err(CatalogError::Unavailable("pool closed".to_owned()))
        }
    }

    fn part(slug: &str, category: PartCategory, tags: &[&str], stock: u32) -> Part {
        Part {
            id: PartId(slug.to_owned()),
            slug: slug.to_owned(),
            name: slug.to_owned(),
            category,
            price: Decimal::new(79_900, 2),
            stock,
            active: true,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            specs: PartSpecs::default(),
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            part("titan-advanced", PartCategory::Gpu, &["gpu"], 2),
            part("rtx-5070", PartCategory::Gpu, &["gpu", "upgrade"], 0),
            part("keyboard-tkl", PartCategory::Peripheral, &["keyboard"], 8),
        ])
    }

    async fn seeded_service() -> RecommendationService<SessionOnlyStore, InMemoryCatalog> {
        let store = SessionOnlyStore::default();
        let now = Utc::now();
        for (slug, session, days) in [
            ("titan-advanced", "s1", 1),
            ("rtx-5070", "s1", 1),
            ("keyboard-tkl", "s1", 2),
            ("titan-advanced", "s2", 3),
            ("keyboard-tkl", "s2", 3),
        ] {
            store
                .append(ViewEvent::new(slug, session, None, now - Duration::days(days)))
                .await
                .expect("append");
        }
        RecommendationService::new(store, catalog(), ScoringParams::default())
    }

    #[tokio::test]
    async fn also_viewed_keeps_out_of_stock_but_cart_does_not() {
        let service = seeded_service().await;

        let also_viewed = service.also_viewed("titan-advanced", None).await;
        let cart = service.for_cart(&["titan-advanced".to_string()], None).await;

        assert_eq!(also_viewed.len(), 2);
        assert_eq!(also_viewed[0].product_slug, "keyboard-tkl");
        assert!(also_viewed.iter().any(|c| c.product_slug == "rtx-5070"));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].product_slug, "keyboard-tkl");
    }

    #[tokio::test]
    async fn upgrades_combine_counts_and_category_overlap() {
        let service = seeded_service().await;

        let upgrades = service.upgrades("titan-advanced", None).await;

        // keyboard: 2 co-occurrences; rtx-5070: 1 co-occurrence + 0.5 overlap
        let flat: Vec<(&str, f64)> =
            upgrades.flat.iter().map(|c| (c.product_slug.as_str(), c.score)).collect();
        assert_eq!(flat, vec![("keyboard-tkl", 2.0), ("rtx-5070", 1.5)]);
        assert!(upgrades.by_bucket.contains_key("GPU"));
        assert!(upgrades.by_bucket.contains_key("Peripheral"));
    }

    #[tokio::test]
    async fn unknown_base_or_broken_catalog_yields_empty_lists() {
        let service = seeded_service().await;
        assert!(service.upgrades("no-such-part", None).await.is_empty());

        let broken = RecommendationService::new(
            SessionOnlyStore::default(),
            BrokenCatalog,
            ScoringParams::default(),
        );
        assert!(broken.upgrades("titan-advanced", None).await.is_empty());
        assert!(broken.also_viewed("titan-advanced", None).await.is_empty());
    }
}
