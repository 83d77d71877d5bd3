//! Upgrade and complement bucketing

use std::collections::{BTreeMap, HashMap};

use super::types::*;
use super::{
    ALWAYS_RELEVANT_TAGS, CATEGORY_OVERLAP_BONUS, CO_OCCURRENCE_BONUS_WEIGHT,
    MAX_UPGRADE_SUGGESTIONS,
};
use crate::compat::parts_compatible;
use crate::domain::part::{Part, PartCategory};

/// Buckets a part belongs to, primary category first.
pub fn bucket_names(part: &Part) -> Vec<String> {
    let mut buckets: Vec<String> = Vec::new();
    for tag in part.category_tags() {
        if let Some(category) = PartCategory::from_tag(&tag) {
            let name = category.bucket_name().to_owned();
            if !buckets.contains(&name) {
                buckets.push(name);
            }
        }
    }
    buckets
}

fn by_score_desc(a: &UpgradeCandidate, b: &UpgradeCandidate) -> std::cmp::Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
}

/// Scores catalog products as upgrades or complements of `base`.
///
/// A product qualifies when it shares a category tag with `base` or carries an
/// always-relevant tag. Hardware that would raise a compatibility error next to `base`
/// is left out, as is anything with a zero score.
pub fn build_upgrade_list(
    base: &Part,
    catalog: &[Part],
    co_occurrence_bonus: &HashMap<String, u32>,
) -> UpgradeList {
    let base_tags = base.category_tags();
    let mut scored = Vec::new();

    for candidate in catalog {
        if candidate.slug == base.slug || !candidate.active {
            continue;
        }

        let tags = candidate.category_tags();
        let overlaps = tags.iter().any(|tag| base_tags.contains(tag));
        let always_relevant = tags.iter().any(|tag| ALWAYS_RELEVANT_TAGS.contains(&tag.as_str()));
        if !overlaps && !always_relevant {
            continue;
        }
        if !parts_compatible(base, candidate) {
            continue;
        }

        let bonus = co_occurrence_bonus.get(&candidate.slug).copied().unwrap_or(0);
        let mut score = f64::from(bonus) * CO_OCCURRENCE_BONUS_WEIGHT;
        if overlaps {
            score += CATEGORY_OVERLAP_BONUS;
        }
        if score <= 0.0 {
            continue;
        }

        scored.push(UpgradeCandidate {
            product_slug: candidate.slug.clone(),
            name: candidate.name.clone(),
            score,
            in_stock: candidate.in_stock(),
            buckets: bucket_names(candidate),
        });
    }

    scored.sort_by(by_score_desc);

    let mut by_bucket: BTreeMap<String, Vec<UpgradeCandidate>> = BTreeMap::new();
    for candidate in &scored {
        for bucket in &candidate.buckets {
            by_bucket.entry(bucket.clone()).or_default().push(candidate.clone());
        }
    }

    scored.truncate(MAX_UPGRADE_SUGGESTIONS);
    UpgradeList { flat: scored, by_bucket }
}
