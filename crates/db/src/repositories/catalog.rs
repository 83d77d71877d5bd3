use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::Row;

use rigsmith_core::catalog::{CatalogError, CatalogReader};
use rigsmith_core::domain::part::{Part, PartCategory, PartId, PartSpecs};

use super::{PartRepository, RepositoryError};
use crate::DbPool;

const PART_COLUMNS: &str =
    "id, slug, name, category, price, stock, active, tags_json, specs_json";

#[derive(Clone)]
pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_active(
        &self,
        category: Option<PartCategory>,
    ) -> Result<Vec<Part>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = match category {
            Some(category) => {
                sqlx::query(&format!(
                    "SELECT {PART_COLUMNS} FROM part
                     WHERE active = 1 AND category = ?
                     ORDER BY slug ASC"
                ))
                .bind(category.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {PART_COLUMNS} FROM part WHERE active = 1 ORDER BY slug ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(row_to_part).collect::<Result<Vec<_>, _>>()
    }
}

fn decode<E: std::fmt::Display>(error: E) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

fn row_to_part(row: &sqlx::sqlite::SqliteRow) -> Result<Part, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode)?;
    let slug: String = row.try_get("slug").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let category: String = row.try_get("category").map_err(decode)?;
    let price: String = row.try_get("price").map_err(decode)?;
    let stock: i64 = row.try_get("stock").map_err(decode)?;
    let active: bool = row.try_get("active").map_err(decode)?;
    let tags_json: String = row.try_get("tags_json").map_err(decode)?;
    let specs_json: String = row.try_get("specs_json").map_err(decode)?;

    let category = PartCategory::from_str(&category).map_err(RepositoryError::Decode)?;
    let price = Decimal::from_str(&price)
        .map_err(|error| RepositoryError::Decode(format!("part `{slug}` price: {error}")))?;
    let stock = u32::try_from(stock)
        .map_err(|_| RepositoryError::Decode(format!("part `{slug}` has invalid stock {stock}")))?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|error| RepositoryError::Decode(format!("part `{slug}` tags: {error}")))?;
    let specs: PartSpecs = serde_json::from_str(&specs_json)
        .map_err(|error| RepositoryError::Decode(format!("part `{slug}` specs: {error}")))?;

    Ok(Part { id: PartId(id), slug, name, category, price, stock, active, tags, specs })
}

#[async_trait]
impl CatalogReader for SqlCatalogRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Part>, CatalogError> {
        let row = sqlx::query(&format!(
            "SELECT {PART_COLUMNS} FROM part WHERE slug = ? AND active = 1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        match row {
            Some(ref r) => Ok(Some(row_to_part(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_category(&self, category: PartCategory) -> Result<Vec<Part>, CatalogError> {
        Ok(self.fetch_active(Some(category)).await?)
    }

    async fn list_all(&self) -> Result<Vec<Part>, CatalogError> {
        Ok(self.fetch_active(None).await?)
    }
}

#[async_trait]
impl PartRepository for SqlCatalogRepository {
    async fn save(&self, part: Part) -> Result<(), RepositoryError> {
        let tags_json = serde_json::to_string(&part.tags).map_err(decode)?;
        let specs_json = serde_json::to_string(&part.specs).map_err(decode)?;

        sqlx::query(
            "INSERT INTO part (id, slug, name, category, price, stock, active,
                               tags_json, specs_json, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 slug = excluded.slug,
                 name = excluded.name,
                 category = excluded.category,
                 price = excluded.price,
                 stock = excluded.stock,
                 active = excluded.active,
                 tags_json = excluded.tags_json,
                 specs_json = excluded.specs_json",
        )
        .bind(&part.id.0)
        .bind(&part.slug)
        .bind(&part.name)
        .bind(part.category.as_str())
        .bind(part.price.to_string())
        .bind(i64::from(part.stock))
        .bind(part.active)
        .bind(tags_json)
        .bind(specs_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM part").fetch_one(&self.pool).await?;
        u64::try_from(count).map_err(decode)
    }
}
