pub mod power;
pub mod rules;

use crate::domain::{
    build::Build,
    part::{Part, PartCategory},
};

pub use power::{estimate_required_watts, recommended_psu_watts};
pub use rules::{check_compatibility, CompatibilityResult};

pub trait CompatibilityEngine: Send + Sync {
    fn check(&self, build: &Build) -> CompatibilityResult;

    fn required_watts(&self, build: &Build) -> u32 {
        estimate_required_watts(build)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicCompatibilityEngine;

impl CompatibilityEngine for DeterministicCompatibilityEngine {
    fn check(&self, build: &Build) -> CompatibilityResult {
        check_compatibility(build)
    }
}

/// True when a build holding only `base` and `candidate` produces no errors.
///
/// Parts that cannot share a build (peripherals, or two parts competing for the same
/// single-valued slot) are never in conflict with each other.
pub fn parts_compatible(base: &Part, candidate: &Part) -> bool {
    let (Some(base_slot), Some(candidate_slot)) = (base.category.slot(), candidate.category.slot())
    else {
        return true;
    };
    if base_slot == candidate_slot && base.category != PartCategory::Storage {
        return true;
    }

    let mut build = Build::new();
    if build.set_part(base_slot, base.clone()).is_err()
        || build.set_part(candidate_slot, candidate.clone()).is_err()
    {
        return true;
    }

    check_compatibility(&build).errors.is_empty()
}
