pub mod catalog;
pub mod compat;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod recommendations;

pub use catalog::{CatalogError, CatalogReader, InMemoryCatalog};
pub use compat::{
    check_compatibility, estimate_required_watts, parts_compatible, recommended_psu_watts,
    CompatibilityEngine, CompatibilityResult, DeterministicCompatibilityEngine,
};
pub use domain::build::{Build, BuildSlot};
pub use domain::part::{CoolerKind, Part, PartCategory, PartId, PartSpecs};
pub use domain::view_event::{
    CoOccurrenceGrouping, CoOccurringView, ViewEvent, ViewEventId,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use events::{EventStoreError, ViewEventStore};
pub use recommendations::{
    RecommendationContext, RecommendationService, ScoredCandidate, ScoringParams, UpgradeList,
};
