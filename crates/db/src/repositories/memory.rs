use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use rigsmith_core::catalog::{CatalogError, CatalogReader};
use rigsmith_core::domain::part::{Part, PartCategory};
use rigsmith_core::domain::view_event::{CoOccurrenceGrouping, CoOccurringView, ViewEvent};
use rigsmith_core::events::{EventStoreError, ViewEventStore};

use super::{PartRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryPartRepository {
    parts: RwLock<HashMap<String, Part>>,
}

impl InMemoryPartRepository {
    async fn active_sorted<F>(&self, keep: F) -> Vec<Part>
    where
        F: Fn(&Part) -> bool,
    {
        let parts = self.parts.read().await;
        let mut found: Vec<Part> =
            parts.values().filter(|part| part.active && keep(part)).cloned().collect();
        found.sort_by(|a, b| a.slug.cmp(&b.slug));
        found
    }
}

#[async_trait]
impl PartRepository for InMemoryPartRepository {
    async fn save(&self, part: Part) -> Result<(), RepositoryError> {
        let mut parts = self.parts.write().await;
        parts.insert(part.id.0.clone(), part);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.parts.read().await.len() as u64)
    }
}

#[async_trait]
impl CatalogReader for InMemoryPartRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Part>, CatalogError> {
        let parts = self.parts.read().await;
        Ok(parts.values().find(|part| part.slug == slug && part.active).cloned())
    }

    async fn find_by_category(&self, category: PartCategory) -> Result<Vec<Part>, CatalogError> {
        Ok(self.active_sorted(|part| part.category == category).await)
    }

    async fn list_all(&self) -> Result<Vec<Part>, CatalogError> {
        Ok(self.active_sorted(|_| true).await)
    }
}

#[derive(Default)]
pub struct InMemoryViewEventStore {
    events: RwLock<Vec<ViewEvent>>,
}

impl InMemoryViewEventStore {
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

fn group_key(event: &ViewEvent, group_by: CoOccurrenceGrouping) -> Option<&str> {
    match group_by {
        CoOccurrenceGrouping::Session => Some(event.session_id.as_str()),
        CoOccurrenceGrouping::Identity => event.user_id.as_deref(),
    }
}

#[async_trait]
impl ViewEventStore for InMemoryViewEventStore {
    async fn append(&self, event: ViewEvent) -> Result<(), EventStoreError> {
        let mut events = self.events.write().await;
        if !events.iter().any(|existing| existing.id == event.id) {
            events.push(event);
        }
        Ok(())
    }

    async fn co_occurring(
        &self,
        anchor_slugs: &[String],
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        group_by: CoOccurrenceGrouping,
    ) -> Result<Vec<CoOccurringView>, EventStoreError> {
        let events = self.events.read().await;
        let in_window: Vec<&ViewEvent> = events
            .iter()
            .filter(|event| event.viewed_at >= since && event.viewed_at <= until)
            .collect();

        let groups: HashSet<&str> = in_window
            .iter()
            .filter(|event| anchor_slugs.contains(&event.slug))
            .filter_map(|event| group_key(event, group_by))
            .collect();
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let mut views: Vec<CoOccurringView> = in_window
            .iter()
            .filter(|event| !anchor_slugs.contains(&event.slug))
            .filter(|event| group_key(event, group_by).is_some_and(|key| groups.contains(key)))
            .map(|event| CoOccurringView { slug: event.slug.clone(), viewed_at: event.viewed_at })
            .collect();
        views.sort_by_key(|view| view.viewed_at);
        Ok(views)
    }
}
