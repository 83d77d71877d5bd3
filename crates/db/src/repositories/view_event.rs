use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};

use rigsmith_core::domain::view_event::{CoOccurrenceGrouping, CoOccurringView, ViewEvent};
use rigsmith_core::events::{EventStoreError, ViewEventStore};

use super::RepositoryError;
use crate::DbPool;

/// Fixed-width UTC timestamps so that text comparison in SQL matches time order.
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid viewed_at `{raw}`: {error}")))
}

#[derive(Clone)]
pub struct SqlViewEventStore {
    pool: DbPool,
}

impl SqlViewEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM product_view").fetch_one(&self.pool).await?;
        u64::try_from(count).map_err(|error| RepositoryError::Decode(error.to_string()))
    }

    async fn insert(&self, event: &ViewEvent) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product_view (id, slug, session_id, user_id, viewed_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&event.id.0)
        .bind(&event.slug)
        .bind(&event.session_id)
        .bind(&event.user_id)
        .bind(encode_timestamp(event.viewed_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select_co_occurring(
        &self,
        anchor_slugs: &[String],
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        group_by: CoOccurrenceGrouping,
    ) -> Result<Vec<CoOccurringView>, RepositoryError> {
        let since = encode_timestamp(since);
        let until = encode_timestamp(until);

        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT v.slug, v.viewed_at FROM product_view v WHERE v.viewed_at >= ",
        );
        query_builder.push_bind(since.clone());
        query_builder.push(" AND v.viewed_at <= ");
        query_builder.push_bind(until.clone());

        query_builder.push(" AND v.slug NOT IN (");
        let mut separated = query_builder.separated(", ");
        for slug in anchor_slugs {
            separated.push_bind(slug.clone());
        }
        query_builder.push(")");

        match group_by {
            CoOccurrenceGrouping::Session => {
                query_builder.push(
                    " AND v.session_id IN (SELECT a.session_id FROM product_view a \
                     WHERE a.viewed_at >= ",
                );
            }
            CoOccurrenceGrouping::Identity => {
                query_builder.push(
                    " AND v.user_id IS NOT NULL AND v.user_id IN (\
                     SELECT a.user_id FROM product_view a \
                     WHERE a.user_id IS NOT NULL AND a.viewed_at >= ",
                );
            }
        }
        query_builder.push_bind(since);
        query_builder.push(" AND a.viewed_at <= ");
        query_builder.push_bind(until);

        query_builder.push(" AND a.slug IN (");
        let mut separated = query_builder.separated(", ");
        for slug in anchor_slugs {
            separated.push_bind(slug.clone());
        }
        query_builder.push("))");

        query_builder.push(" ORDER BY v.viewed_at ASC, v.id ASC");

        let rows = query_builder.build().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                let slug: String =
                    row.try_get("slug").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let viewed_at: String =
                    row.try_get("viewed_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                Ok(CoOccurringView { slug, viewed_at: decode_timestamp(&viewed_at)? })
            })
            .collect()
    }
}

#[async_trait]
impl ViewEventStore for SqlViewEventStore {
    async fn append(&self, event: ViewEvent) -> Result<(), EventStoreError> {
        Ok(self.insert(&event).await?)
    }

    async fn co_occurring(
        &self,
        anchor_slugs: &[String],
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        group_by: CoOccurrenceGrouping,
    ) -> Result<Vec<CoOccurringView>, EventStoreError> {
        if anchor_slugs.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.select_co_occurring(anchor_slugs, since, until, group_by).await?)
    }
}
