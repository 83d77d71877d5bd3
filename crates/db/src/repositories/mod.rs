use async_trait::async_trait;
use thiserror::Error;

use rigsmith_core::catalog::CatalogError;
use rigsmith_core::domain::part::Part;
use rigsmith_core::events::EventStoreError;

pub mod catalog;
pub mod memory;
pub mod view_event;

pub use catalog::SqlCatalogRepository;
pub use memory::{InMemoryPartRepository, InMemoryViewEventStore};
pub use view_event::SqlViewEventStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for CatalogError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => Self::Unavailable(error.to_string()),
            RepositoryError::Decode(message) => Self::Decode(message),
        }
    }
}

impl From<RepositoryError> for EventStoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => Self::Unavailable(error.to_string()),
            RepositoryError::Decode(message) => Self::Decode(message),
        }
    }
}

/// Catalog writes. Reads go through `CatalogReader`.
#[async_trait]
pub trait PartRepository: Send + Sync {
    async fn save(&self, part: Part) -> Result<(), RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}
