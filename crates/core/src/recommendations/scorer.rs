//! Time-decayed co-occurrence scoring

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::types::*;
use crate::catalog::CatalogReader;
use crate::domain::view_event::{CoOccurrenceGrouping, CoOccurringView};
use crate::events::{EventStoreError, ViewEventStore};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Recency discount `exp(-lambda * age_days)`. Negative ages count as zero.
pub fn decay_weight(age_days: f64, decay_lambda: f64) -> f64 {
    (-decay_lambda * age_days.max(0.0)).exp()
}

fn age_in_days(now: DateTime<Utc>, viewed_at: DateTime<Utc>) -> f64 {
    (now - viewed_at).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Additive score accumulator that remembers first-seen order for tie-breaking.
#[derive(Debug, Default)]
struct ScoreBoard {
    order: Vec<String>,
    scores: HashMap<String, f64>,
}

impl ScoreBoard {
    fn add(&mut self, slug: &str, contribution: f64) {
        match self.scores.get_mut(slug) {
            Some(score) => *score += contribution,
            None => {
                self.order.push(slug.to_owned());
                self.scores.insert(slug.to_owned(), contribution);
            }
        }
    }

    fn ranked(self) -> Vec<ScoredCandidate> {
        let Self { order, scores } = self;
        let mut ranked: Vec<ScoredCandidate> = order
            .into_iter()
            .map(|slug| {
                let score = scores.get(&slug).copied().unwrap_or_default();
                ScoredCandidate { product_slug: slug, score }
            })
            .collect();

        // Stable sort keeps first-seen order among equal scores.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Per-slug decayed subtotal for one signal, in first-seen order.
fn signal_subtotals(
    views: &[CoOccurringView],
    anchors: &HashSet<&str>,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
    decay_lambda: f64,
) -> Vec<(String, f64)> {
    let mut board = ScoreBoard::default();
    for view in views {
        if view.viewed_at < since || view.viewed_at > now || anchors.contains(view.slug.as_str()) {
            continue;
        }
        board.add(&view.slug, decay_weight(age_in_days(now, view.viewed_at), decay_lambda));
    }

    let ScoreBoard { order, scores } = board;
    order
        .into_iter()
        .map(|slug| {
            let subtotal = scores.get(&slug).copied().unwrap_or_default();
            (slug, subtotal)
        })
        .collect()
}

/// Weighted sum of per-signal subtotals, ranked by total score.
fn fuse_signals(signals: &[(f64, Vec<(String, f64)>)]) -> Vec<ScoredCandidate> {
    let mut board = ScoreBoard::default();
    for (weight, subtotals) in signals {
        for (slug, subtotal) in subtotals {
            board.add(slug, weight * subtotal);
        }
    }
    board.ranked()
}

/// Trims, drops blanks and de-duplicates anchor slugs, preserving order.
fn normalize_anchors(anchor_slugs: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    anchor_slugs
        .iter()
        .map(|slug| slug.trim())
        .filter(|slug| !slug.is_empty() && seen.insert(slug.to_string()))
        .map(str::to_owned)
        .collect()
}

/// Ranks products viewed alongside a set of anchors.
#[derive(Debug, Clone)]
pub struct CoOccurrenceScorer<S, C> {
    store: S,
    catalog: C,
    weights: SignalWeights,
}

impl<S, C> CoOccurrenceScorer<S, C>
where
    S: ViewEventStore,
    C: CatalogReader,
{
    pub fn new(store: S, catalog: C) -> Self {
        Self::with_weights(store, catalog, SignalWeights::default())
    }

    pub fn with_weights(store: S, catalog: C, weights: SignalWeights) -> Self {
        Self { store, catalog, weights }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Ranked related products as of now. Never fails; degraded paths return empty.
    pub async fn score_related(
        &self,
        anchor_slugs: &[String],
        params: ScoringParams,
        context: RecommendationContext,
    ) -> Vec<ScoredCandidate> {
        self.score_related_at(anchor_slugs, params, context, Utc::now()).await
    }

    pub async fn score_related_at(
        &self,
        anchor_slugs: &[String],
        params: ScoringParams,
        context: RecommendationContext,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        let ranked = match self.fused_scores(anchor_slugs, params, now).await {
            Ok(ranked) => ranked,
            Err(error) => {
                warn!(
                    event_name = "recommendations.scorer.store_failed",
                    error = %error,
                    "co-occurrence query failed; returning no recommendations"
                );
                return Vec::new();
            }
        };

        let mut joined = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let part = match self.catalog.find_by_slug(&candidate.product_slug).await {
                Ok(part) => part,
                Err(error) => {
                    warn!(
                        event_name = "recommendations.scorer.catalog_failed",
                        product_slug = %candidate.product_slug,
                        error = %error,
                        "catalog lookup failed; returning no recommendations"
                    );
                    return Vec::new();
                }
            };

            match part {
                Some(part) if !context.requires_stock() || part.in_stock() => {
                    joined.push(candidate)
                }
                _ => {}
            }
        }

        joined
    }

    /// Fused ranking before the catalog join, truncated to `params.limit`.
    pub async fn fused_scores(
        &self,
        anchor_slugs: &[String],
        params: ScoringParams,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>, EventStoreError> {
        let anchors = normalize_anchors(anchor_slugs);
        if anchors.is_empty() || params.is_degenerate() {
            debug!(
                event_name = "recommendations.scorer.skipped",
                anchor_count = anchors.len(),
                "empty anchor set or unusable parameters"
            );
            return Ok(Vec::new());
        }

        let since = now - Duration::days(i64::from(params.window_days));
        let (session_views, identity_views) = tokio::join!(
            self.store.co_occurring(&anchors, since, now, CoOccurrenceGrouping::Session),
            self.store.co_occurring(&anchors, since, now, CoOccurrenceGrouping::Identity),
        );
        let (session_views, identity_views) = (session_views?, identity_views?);

        let anchor_set: HashSet<&str> = anchors.iter().map(String::as_str).collect();
        let subtotals = |views: &[CoOccurringView]| {
            signal_subtotals(views, &anchor_set, since, now, params.decay_lambda)
        };
        let signals = [
            (self.weights.session, subtotals(&session_views)),
            (self.weights.identity, subtotals(&identity_views)),
        ];

        let mut ranked = fuse_signals(&signals);
        ranked.truncate(params.limit);
        Ok(ranked)
    }

    /// Raw (undecayed) session co-occurrence counts for a single anchor.
    pub async fn co_occurrence_counts(
        &self,
        anchor_slug: &str,
        params: ScoringParams,
        now: DateTime<Utc>,
    ) -> Result<HashMap<String, u32>, EventStoreError> {
        let anchors = normalize_anchors(&[anchor_slug.to_owned()]);
        if anchors.is_empty() || params.window_days == 0 {
            return Ok(HashMap::new());
        }

        let since = now - Duration::days(i64::from(params.window_days));
        let views =
            self.store.co_occurring(&anchors, since, now, CoOccurrenceGrouping::Session).await?;

        let mut counts = HashMap::new();
        for view in views {
            if view.viewed_at < since || view.viewed_at > now || anchors.contains(&view.slug) {
                continue;
            }
            *counts.entry(view.slug).or_insert(0u32) += 1;
        }
        Ok(counts)
    }
}
