use serde::{Deserialize, Serialize};

use super::power::{estimate_required_watts, recommended_psu_watts};
use crate::domain::{
    build::Build,
    part::{CoolerKind, Part},
};

/// GPU thermal design power at which the high-power connector advisory kicks in.
pub const HIGH_POWER_GPU_TDP_W: u32 = 300;
/// CPU thermal design power above which air cooler capacity is checked.
pub const COOLER_CHECK_CPU_TDP_W: u32 = 120;
pub const LARGE_RADIATOR_MM: u32 = 360;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub tips: Vec<String>,
    pub estimated_watts: u32,
}

impl Default for CompatibilityResult {
    fn default() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            tips: Vec::new(),
            estimated_watts: 0,
        }
    }
}

type Rule = fn(&Build, &mut CompatibilityResult);

/// Canonical evaluation order; output list order follows it.
const RULES: &[Rule] = &[
    socket_match,
    memory_generation_match,
    memory_speed_ceiling,
    gpu_physical_fit,
    radiator_fit,
    cooler_socket_support,
    power_sufficiency,
    pcie_generation_mismatch,
    high_power_connector,
    cooler_thermal_capacity,
    missing_storage,
];

/// Evaluates every rule against `build`. Absent parts skip the rules that need them.
pub fn check_compatibility(build: &Build) -> CompatibilityResult {
    let mut result = CompatibilityResult {
        estimated_watts: estimate_required_watts(build),
        ..CompatibilityResult::default()
    };

    for rule in RULES {
        rule(build, &mut result);
    }

    result.ok = result.errors.is_empty();
    result
}

fn pair<'a>(left: &'a Option<Part>, right: &'a Option<Part>) -> Option<(&'a Part, &'a Part)> {
    left.as_ref().zip(right.as_ref())
}

fn socket_match(build: &Build, result: &mut CompatibilityResult) {
    let Some((cpu, mb)) = pair(&build.cpu, &build.motherboard) else { return };
    let (Some(cpu_socket), Some(mb_socket)) = (&cpu.specs.socket, &mb.specs.socket) else {
        return;
    };

    if !cpu_socket.eq_ignore_ascii_case(mb_socket) {
        result.errors.push(format!(
            "CPU socket {cpu_socket} is not compatible with motherboard socket {mb_socket}."
        ));
    }
}

fn memory_generation_match(build: &Build, result: &mut CompatibilityResult) {
    let Some((mb, ram)) = pair(&build.motherboard, &build.ram) else { return };
    let (Some(mb_gen), Some(ram_gen)) = (&mb.specs.ram_gen, &ram.specs.ram_gen) else { return };

    if !ram_gen.eq_ignore_ascii_case(mb_gen) {
        result.errors.push(format!(
            "{ram_gen} memory is not supported by a motherboard that requires {mb_gen}."
        ));
    }
}

fn memory_speed_ceiling(build: &Build, result: &mut CompatibilityResult) {
    let Some((mb, ram)) = pair(&build.motherboard, &build.ram) else { return };
    let (Some(max_speed), Some(speed)) = (mb.specs.max_memory_speed_mhz, ram.specs.memory_speed_mhz)
    else {
        return;
    };

    if speed > max_speed {
        result.warnings.push(format!(
            "RAM rated at {speed}MHz exceeds the motherboard's {max_speed}MHz ceiling; it will run at a reduced speed."
        ));
    }
}

fn gpu_physical_fit(build: &Build, result: &mut CompatibilityResult) {
    let Some((gpu, case)) = pair(&build.gpu, &build.case) else { return };
    let (Some(length), Some(max_length)) = (gpu.specs.gpu_length_mm, case.specs.max_gpu_length_mm)
    else {
        return;
    };

    if length > max_length {
        result.errors.push(format!(
            "GPU length {length}mm exceeds the case's {max_length}mm clearance."
        ));
    }
}

fn radiator_fit(build: &Build, result: &mut CompatibilityResult) {
    let Some((cooler, case)) = pair(&build.cooler, &build.case) else { return };
    if !cooler.is_liquid_cooler() || cooler.specs.radiator_mm != Some(LARGE_RADIATOR_MM) {
        return;
    }

    if !case.specs.supports_360_radiator.unwrap_or(false) {
        result.warnings.push(
            "This case does not support a 360mm radiator; choose a 240/280mm cooler or a case with 360mm mounting."
                .to_string(),
        );
    }
}

fn cooler_socket_support(build: &Build, result: &mut CompatibilityResult) {
    let Some((cooler, cpu)) = pair(&build.cooler, &build.cpu) else { return };
    let Some(socket) = &cpu.specs.socket else { return };
    if cooler.specs.compatible_sockets.is_empty() {
        return;
    }

    let supported = cooler.specs.compatible_sockets.iter().any(|s| s.eq_ignore_ascii_case(socket));
    if !supported {
        result.errors.push(format!("The selected cooler does not support CPU socket {socket}."));
    }
}

/// Skipped for an empty build, which only reports missing storage.
fn power_sufficiency(build: &Build, result: &mut CompatibilityResult) {
    if build.is_empty() {
        return;
    }
    let required = result.estimated_watts;

    let Some(psu) = &build.psu else {
        result.warnings.push(format!(
            "No power supply selected; choose one rated for at least {required}W."
        ));
        return;
    };

    let wattage = psu.specs.wattage_w.unwrap_or(0);
    // wattage < 1.25 * required, kept in integers.
    if u64::from(wattage) * 4 < u64::from(required) * 5 {
        let floor = recommended_psu_watts(required);
        result.warnings.push(format!(
            "A {wattage}W power supply leaves too little headroom for an estimated {required}W draw; choose at least {floor}W."
        ));
    }
}

fn pcie_generation_mismatch(build: &Build, result: &mut CompatibilityResult) {
    let Some((gpu, mb)) = pair(&build.gpu, &build.motherboard) else { return };
    let (Some(gpu_gen), Some(slot_gen)) = (gpu.specs.pcie_gen, mb.specs.pcie_x16_gen) else {
        return;
    };

    if gpu_gen > slot_gen {
        result.tips.push(format!(
            "The GPU is PCIe {gpu_gen}.0 but the motherboard x16 slot is PCIe {slot_gen}.0; the link runs at {slot_gen}.0 with no functional impact."
        ));
    }
}

fn high_power_connector(build: &Build, result: &mut CompatibilityResult) {
    let Some((gpu, psu)) = pair(&build.gpu, &build.psu) else { return };
    let Some(tdp) = gpu.specs.tdp_w else { return };

    if tdp >= HIGH_POWER_GPU_TDP_W && !psu.specs.has_12vhpwr_connector.unwrap_or(false) {
        result.tips.push(format!(
            "This {tdp}W GPU is best paired with a PSU that has a native 12V-2x6 (12VHPWR) connector instead of adapters."
        ));
    }
}

fn cooler_thermal_capacity(build: &Build, result: &mut CompatibilityResult) {
    let Some((cpu, cooler)) = pair(&build.cpu, &build.cooler) else { return };
    let Some(cpu_tdp) = cpu.specs.tdp_w else { return };
    if cpu_tdp <= COOLER_CHECK_CPU_TDP_W || cooler.specs.cooler_kind != Some(CoolerKind::Air) {
        return;
    }

    if let Some(capacity) = cooler.specs.cooler_max_tdp_w {
        if capacity < cpu_tdp {
            result.warnings.push(format!(
                "The air cooler is rated for {capacity}W but the CPU has a {cpu_tdp}W TDP; expect throttling under sustained load."
            ));
        }
    }
}

fn missing_storage(build: &Build, result: &mut CompatibilityResult) {
    if build.storage.is_empty() {
        result
            .warnings
            .push("No storage device selected; the system cannot boot without one.".to_string());
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::check_compatibility;
    use crate::domain::{
        build::Build,
        part::{CoolerKind, Part, PartCategory, PartId, PartSpecs},
    };

    fn part(category: PartCategory, specs: PartSpecs) -> Part {
        Part {
            id: PartId(format!("{}-test", category.as_str())),
            slug: format!("{}-test", category.as_str()),
            name: category.bucket_name().to_owned(),
            category,
            price: Decimal::new(19_900, 2),
            stock: 5,
            active: true,
            tags: Vec::new(),
            specs,
        }
    }

    fn cpu(socket: &str, tdp: u32) -> Part {
        part(
            PartCategory::Cpu,
            PartSpecs { socket: Some(socket.to_owned()), tdp_w: Some(tdp), ..Default::default() },
        )
    }

    fn motherboard(socket: &str) -> Part {
        part(
            PartCategory::Motherboard,
            PartSpecs { socket: Some(socket.to_owned()), ..Default::default() },
        )
    }

    fn psu(wattage: u32) -> Part {
        part(PartCategory::Psu, PartSpecs { wattage_w: Some(wattage), ..Default::default() })
    }

    fn ssd() -> Part {
        part(PartCategory::Storage, PartSpecs { capacity_gb: Some(1000), ..Default::default() })
    }

    fn socket_errors(build: &Build) -> usize {
        check_compatibility(build).errors.iter().filter(|e| e.contains("CPU socket")).count()
    }

    #[test]
    fn empty_build_only_warns_about_storage() {
        let result = check_compatibility(&Build::default());

        assert!(result.ok);
        assert!(result.errors.is_empty());
        assert_eq!(
            result.warnings,
            vec!["No storage device selected; the system cannot boot without one.".to_string()]
        );
        assert!(result.tips.is_empty());
    }

    #[test]
    fn missing_psu_warns_without_cpu_or_gpu() {
        let build = Build {
            motherboard: Some(motherboard("AM5")),
            ram: Some(part(PartCategory::Ram, PartSpecs::default())),
            case: Some(part(PartCategory::Case, PartSpecs::default())),
            storage: vec![ssd()],
            ..Build::default()
        };

        let result = check_compatibility(&build);

        assert!(result.ok);
        assert_eq!(result.estimated_watts, 114);
        assert_eq!(
            result.warnings,
            vec!["No power supply selected; choose one rated for at least 114W.".to_string()]
        );
    }

    #[test]
    fn socket_rule_fires_exactly_once_on_mismatch() {
        for (cpu_socket, mb_socket, expected) in
            [("AM5", "AM5", 0), ("AM5", "AM4", 1), ("LGA1700", "AM5", 1), ("LGA1851", "LGA1851", 0)]
        {
            let build = Build {
                cpu: Some(cpu(cpu_socket, 105)),
                motherboard: Some(motherboard(mb_socket)),
                ..Build::default()
            };
            assert_eq!(socket_errors(&build), expected, "{cpu_socket} vs {mb_socket}");
        }
    }

    #[test]
    fn socket_mismatch_scenario_is_not_ok() {
        let build = Build {
            cpu: Some(cpu("AM5", 120)),
            motherboard: Some(motherboard("AM4")),
            ..Build::default()
        };

        let result = check_compatibility(&build);

        assert!(!result.ok);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("AM5") && result.errors[0].contains("AM4"));
        assert!(result.warnings.iter().all(|w| !w.contains("socket")));
        assert!(result.warnings.iter().any(|w| w.contains("No power supply selected")));
    }

    #[test]
    fn power_warning_respects_headroom_boundary() {
        let mut build = Build {
            cpu: Some(cpu("AM5", 120)),
            storage: vec![ssd()],
            ..Build::default()
        };
        // 120 + 5 + 9 + 5 + 30
        let required = 169u32;
        assert_eq!(check_compatibility(&build).estimated_watts, required);

        let below = (f64::from(required) * 1.25).floor() as u32 - 1;
        let at = (f64::from(required) * 1.25).ceil() as u32;

        build.psu = Some(psu(below));
        let warned = check_compatibility(&build);
        assert_eq!(warned.warnings.len(), 1);
        assert!(warned.warnings[0].contains("choose at least 254W"));
        assert!(warned.ok);

        build.psu = Some(psu(at));
        assert!(check_compatibility(&build).warnings.is_empty());
    }

    #[test]
    fn memory_and_fit_rules() {
        let build = Build {
            motherboard: Some(part(
                PartCategory::Motherboard,
                PartSpecs {
                    ram_gen: Some("DDR5".to_owned()),
                    max_memory_speed_mhz: Some(6000),
                    pcie_x16_gen: Some(4),
                    ..Default::default()
                },
            )),
            ram: Some(part(
                PartCategory::Ram,
                PartSpecs {
                    ram_gen: Some("DDR4".to_owned()),
                    memory_speed_mhz: Some(6400),
                    ..Default::default()
                },
            )),
            gpu: Some(part(
                PartCategory::Gpu,
                PartSpecs { gpu_length_mm: Some(340), pcie_gen: Some(5), ..Default::default() },
            )),
            case: Some(part(
                PartCategory::Case,
                PartSpecs { max_gpu_length_mm: Some(320), ..Default::default() },
            )),
            storage: vec![ssd()],
            ..Build::default()
        };

        let result = check_compatibility(&build);

        assert!(!result.ok);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("DDR4"));
        assert!(result.errors[1].contains("340mm"));
        assert!(result.warnings[0].contains("6400MHz"));
        assert_eq!(result.tips.len(), 1);
        assert!(result.tips[0].contains("PCIe 5.0"));
    }

    #[test]
    fn cooler_rules() {
        let liquid = part(
            PartCategory::Cooler,
            PartSpecs {
                cooler_kind: Some(CoolerKind::Liquid),
                radiator_mm: Some(360),
                compatible_sockets: vec!["LGA1700".to_owned()],
                ..Default::default()
            },
        );
        let build = Build {
            cpu: Some(cpu("AM5", 170)),
            cooler: Some(liquid),
            case: Some(part(PartCategory::Case, PartSpecs::default())),
            storage: vec![ssd()],
            psu: Some(psu(1000)),
            ..Build::default()
        };

        let result = check_compatibility(&build);
        assert_eq!(
            result.errors,
            vec!["The selected cooler does not support CPU socket AM5.".to_string()]
        );
        assert!(result.warnings.iter().any(|w| w.contains("360mm radiator")));

        let air = part(
            PartCategory::Cooler,
            PartSpecs {
                cooler_kind: Some(CoolerKind::Air),
                cooler_max_tdp_w: Some(150),
                compatible_sockets: vec!["am5".to_owned()],
                ..Default::default()
            },
        );
        let build = Build { cooler: Some(air), ..build };

        let result = check_compatibility(&build);
        assert!(result.ok);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("rated for 150W"));
    }

    #[test]
    fn high_power_gpu_tip_needs_psu_without_connector() {
        let gpu = part(PartCategory::Gpu, PartSpecs { tdp_w: Some(320), ..Default::default() });
        let mut build = Build {
            gpu: Some(gpu),
            psu: Some(psu(1200)),
            storage: vec![ssd()],
            ..Build::default()
        };

        let result = check_compatibility(&build);
        assert_eq!(result.tips.len(), 1);
        assert!(result.tips[0].contains("12V-2x6"));

        if let Some(psu) = build.psu.as_mut() {
            psu.specs.has_12vhpwr_connector = Some(true);
        }
        assert!(check_compatibility(&build).tips.is_empty());
    }

    #[test]
    fn repeated_checks_are_identical() {
        let build = Build {
            cpu: Some(cpu("AM5", 170)),
            motherboard: Some(motherboard("AM4")),
            psu: Some(psu(250)),
            ..Build::default()
        };

        let first = check_compatibility(&build);
        let second = check_compatibility(&build);

        assert_eq!(first, second);
        assert_eq!(first.errors.len(), 1);
        assert_eq!(first.warnings.len(), 2);
    }
}
