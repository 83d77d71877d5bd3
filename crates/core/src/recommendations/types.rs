//! Types for the recommendation engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Query window, decay rate and result cap for co-occurrence scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// Look-back window in days, measured from the time of the query
    pub window_days: u32,
    /// Exponential decay rate per day of view age
    pub decay_lambda: f64,
    /// Maximum number of ranked candidates
    pub limit: usize,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            window_days: super::DEFAULT_WINDOW_DAYS,
            decay_lambda: super::DEFAULT_DECAY_LAMBDA,
            limit: super::DEFAULT_LIMIT,
        }
    }
}

impl ScoringParams {
    /// Parameters that cannot produce a meaningful ranking.
    pub fn is_degenerate(&self) -> bool {
        self.window_days == 0
            || self.limit == 0
            || !self.decay_lambda.is_finite()
            || self.decay_lambda < 0.0
    }
}

/// Where a recommendation will be shown. Controls stock filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationContext {
    /// "Customers also viewed" on a single product page; out-of-stock parts stay
    AlsoViewed,
    /// Suggestions next to a cart or build; out-of-stock parts are dropped
    Cart,
}

impl RecommendationContext {
    pub fn requires_stock(&self) -> bool {
        matches!(self, Self::Cart)
    }
}

/// A related product with its fused, decayed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub product_slug: String,
    pub score: f64,
}

/// Relative weight of each co-occurrence signal in the fused score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub session: f64,
    pub identity: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        super::DEFAULT_SIGNAL_WEIGHTS
    }
}

/// A catalog product proposed as an upgrade or complement for a base product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCandidate {
    pub product_slug: String,
    pub name: String,
    pub score: f64,
    pub in_stock: bool,
    pub buckets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeList {
    pub flat: Vec<UpgradeCandidate>,
    pub by_bucket: BTreeMap<String, Vec<UpgradeCandidate>>,
}

impl UpgradeList {
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty() && self.by_bucket.is_empty()
    }
}
