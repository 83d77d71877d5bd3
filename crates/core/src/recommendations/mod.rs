//! Related-product recommendations
//!
//! Scores "frequently viewed together" candidates from time-decayed view co-occurrence
//! and classifies catalog products into upgrade/complement buckets. Every path here is
//! best effort: upstream failures are logged and yield empty results.

mod classifier;
mod scorer;
mod service;
mod types;

pub use classifier::{build_upgrade_list, bucket_names};
pub use scorer::{decay_weight, CoOccurrenceScorer};
pub use service::RecommendationService;
pub use types::*;

/// Default look-back window in days
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Default decay rate per day
pub const DEFAULT_DECAY_LAMBDA: f64 = 0.1;

/// Default number of ranked candidates
pub const DEFAULT_LIMIT: usize = 8;

/// Session co-occurrence counts fully, shared user identity at half weight
pub const DEFAULT_SIGNAL_WEIGHTS: SignalWeights = SignalWeights { session: 1.0, identity: 0.5 };

/// Tags that make a product relevant to any base product
pub const ALWAYS_RELEVANT_TAGS: &[&str] =
    &["peripheral", "accessory", "upgrade", "complement", "monitor", "keyboard", "mouse"];

/// Bonus for sharing at least one category tag with the base product
pub const CATEGORY_OVERLAP_BONUS: f64 = 0.5;

/// Weight applied to each co-occurrence count in upgrade scoring
pub const CO_OCCURRENCE_BONUS_WEIGHT: f64 = 1.0;

/// Size cap of the flat upgrade list
pub const MAX_UPGRADE_SUGGESTIONS: usize = 10;
