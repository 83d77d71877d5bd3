use crate::domain::{build::Build, part::CoolerKind};

pub const DEFAULT_CPU_TDP_W: u32 = 65;
pub const STORAGE_DEVICE_W: u32 = 5;
pub const CASE_FAN_W: u32 = 3;
pub const DEFAULT_CASE_FAN_COUNT: u32 = 3;
pub const LIQUID_PUMP_W: u32 = 20;
pub const AIR_COOLER_W: u32 = 5;
pub const PLATFORM_BASELINE_W: u32 = 30;

/// Advisory wattage draw of the build. Callers apply their own safety multiplier.
pub fn estimate_required_watts(build: &Build) -> u32 {
    let cpu = build.cpu.as_ref().and_then(|cpu| cpu.specs.tdp_w).unwrap_or(DEFAULT_CPU_TDP_W);
    let gpu = build.gpu.as_ref().and_then(|gpu| gpu.specs.tdp_w).unwrap_or(0);

    let storage_devices = u32::try_from(build.storage.len()).unwrap_or(u32::MAX);
    let storage = storage_devices.saturating_mul(STORAGE_DEVICE_W);

    let fans = build
        .case
        .as_ref()
        .and_then(|case| case.specs.fan_count)
        .unwrap_or(DEFAULT_CASE_FAN_COUNT)
        .saturating_mul(CASE_FAN_W);

    // An unselected cooler is assumed to be the stock air cooler.
    let cooling = match build.cooler.as_ref().and_then(|cooler| cooler.specs.cooler_kind) {
        Some(CoolerKind::Liquid) => LIQUID_PUMP_W,
        Some(CoolerKind::Air) | None => AIR_COOLER_W,
    };

    cpu.saturating_add(gpu)
        .saturating_add(storage)
        .saturating_add(fans)
        .saturating_add(cooling)
        .saturating_add(PLATFORM_BASELINE_W)
}

/// Smallest PSU rating that gives `required_watts` a 1.5x margin, rounded up.
pub fn recommended_psu_watts(required_watts: u32) -> u32 {
    let floor = (u64::from(required_watts) * 3).div_ceil(2);
    u32::try_from(floor).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{estimate_required_watts, recommended_psu_watts};
    use crate::domain::{
        build::Build,
        part::{CoolerKind, Part, PartCategory, PartId, PartSpecs},
    };

    fn part(category: PartCategory, specs: PartSpecs) -> Part {
        Part {
            id: PartId(format!("{}-1", category.as_str())),
            slug: format!("{}-1", category.as_str()),
            name: category.bucket_name().to_owned(),
            category,
            price: Decimal::new(9_900, 2),
            stock: 1,
            active: true,
            tags: Vec::new(),
            specs,
        }
    }

    fn build_with(cpu_tdp: u32, gpu_tdp: u32, storage: usize, fans: u32) -> Build {
        Build {
            cpu: Some(part(
                PartCategory::Cpu,
                PartSpecs { tdp_w: Some(cpu_tdp), ..Default::default() },
            )),
            gpu: Some(part(
                PartCategory::Gpu,
                PartSpecs { tdp_w: Some(gpu_tdp), ..Default::default() },
            )),
            storage: (0..storage)
                .map(|_| part(PartCategory::Storage, PartSpecs::default()))
                .collect(),
            case: Some(part(
                PartCategory::Case,
                PartSpecs { fan_count: Some(fans), ..Default::default() },
            )),
            ..Build::default()
        }
    }

    #[test]
    fn empty_build_uses_defaults() {
        // 65 cpu + 0 gpu + 0 storage + 3 fans * 3 + 5 air + 30 baseline
        assert_eq!(estimate_required_watts(&Build::default()), 109);
    }

    #[test]
    fn sums_every_component() {
        let mut build = build_with(120, 250, 2, 4);
        build.cooler = Some(part(
            PartCategory::Cooler,
            PartSpecs { cooler_kind: Some(CoolerKind::Liquid), ..Default::default() },
        ));

        // 120 + 250 + 2*5 + 4*3 + 20 + 30
        assert_eq!(estimate_required_watts(&build), 442);
    }

    #[test]
    fn is_monotonic_in_each_input() {
        let base = estimate_required_watts(&build_with(100, 200, 1, 3));

        assert!(estimate_required_watts(&build_with(101, 200, 1, 3)) >= base);
        assert!(estimate_required_watts(&build_with(100, 201, 1, 3)) >= base);
        assert!(estimate_required_watts(&build_with(100, 200, 2, 3)) >= base);
        assert!(estimate_required_watts(&build_with(100, 200, 1, 4)) >= base);

        for step in 0..20 {
            assert!(
                estimate_required_watts(&build_with(100 + step * 10, 200, 1, 3))
                    <= estimate_required_watts(&build_with(110 + step * 10, 200, 1, 3))
            );
        }
    }

    #[test]
    fn recommended_rating_rounds_up() {
        assert_eq!(recommended_psu_watts(169), 254);
        assert_eq!(recommended_psu_watts(400), 600);
        assert_eq!(recommended_psu_watts(0), 0);
    }
}
