use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::view_event::{CoOccurrenceGrouping, CoOccurringView, ViewEvent};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EventStoreError {
    #[error("event store unavailable: {0}")]
    Unavailable(String),
    #[error("event record could not be decoded: {0}")]
    Decode(String),
}

/// Append-only store of product views.
///
/// `co_occurring` returns every view made within `[since, until]` by a session (or user
/// identity) that also viewed one of `anchor_slugs` within the same window, excluding
/// views of the anchors themselves. Decay weighting is left to the caller.
#[async_trait]
pub trait ViewEventStore: Send + Sync {
    async fn append(&self, event: ViewEvent) -> Result<(), EventStoreError>;

    async fn co_occurring(
        &self,
        anchor_slugs: &[String],
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        group_by: CoOccurrenceGrouping,
    ) -> Result<Vec<CoOccurringView>, EventStoreError>;
}
