use async_trait::async_trait;
use thiserror::Error;

use crate::domain::part::{Part, PartCategory};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("catalog record could not be decoded: {0}")]
    Decode(String),
}

/// Read-only catalog lookups consumed by the compatibility and recommendation paths.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Part>, CatalogError>;
    async fn find_by_category(&self, category: PartCategory) -> Result<Vec<Part>, CatalogError>;
    async fn list_all(&self) -> Result<Vec<Part>, CatalogError>;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    parts: Vec<Part>,
}

impl InMemoryCatalog {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Part>, CatalogError> {
        Ok(self.parts.iter().find(|part| part.slug == slug && part.active).cloned())
    }

    async fn find_by_category(&self, category: PartCategory) -> Result<Vec<Part>, CatalogError> {
        Ok(self
            .parts
            .iter()
            .filter(|part| part.category == category && part.active)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Part>, CatalogError> {
        Ok(self.parts.iter().filter(|part| part.active).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CatalogReader, InMemoryCatalog};
    use crate::domain::part::{Part, PartCategory, PartId, PartSpecs};

    fn part(slug: &str, category: PartCategory, active: bool) -> Part {
        Part {
            id: PartId(format!("id-{slug}")),
            slug: slug.to_owned(),
            name: slug.to_owned(),
            category,
            price: Decimal::new(4_999, 2),
            stock: 0,
            active,
            tags: Vec::new(),
            specs: PartSpecs::default(),
        }
    }

    #[tokio::test]
    async fn lookups_skip_inactive_parts() {
        let catalog = InMemoryCatalog::new(vec![
            part("rtx-5070", PartCategory::Gpu, true),
            part("rtx-3060", PartCategory::Gpu, false),
            part("b650", PartCategory::Motherboard, true),
        ]);

        assert!(catalog.find_by_slug("rtx-5070").await.expect("lookup").is_some());
        assert!(catalog.find_by_slug("rtx-3060").await.expect("lookup").is_none());
        assert_eq!(catalog.find_by_category(PartCategory::Gpu).await.expect("category").len(), 1);
        assert_eq!(catalog.list_all().await.expect("list").len(), 2);
    }
}
