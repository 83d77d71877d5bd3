use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::build::BuildSlot;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    Cpu,
    Motherboard,
    Ram,
    Gpu,
    Storage,
    Psu,
    Case,
    Cooler,
    Peripheral,
}

impl PartCategory {
    pub const ALL: [PartCategory; 9] = [
        Self::Cpu,
        Self::Motherboard,
        Self::Ram,
        Self::Gpu,
        Self::Storage,
        Self::Psu,
        Self::Case,
        Self::Cooler,
        Self::Peripheral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Motherboard => "motherboard",
            Self::Ram => "ram",
            Self::Gpu => "gpu",
            Self::Storage => "storage",
            Self::Psu => "psu",
            Self::Case => "case",
            Self::Cooler => "cooler",
            Self::Peripheral => "peripheral",
        }
    }

    /// Display name used for recommendation buckets.
    pub fn bucket_name(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Motherboard => "Motherboard",
            Self::Ram => "RAM",
            Self::Gpu => "GPU",
            Self::Storage => "Storage",
            Self::Psu => "PSU",
            Self::Case => "Case",
            Self::Cooler => "Cooler",
            Self::Peripheral => "Peripheral",
        }
    }

    /// Build slot a part of this category occupies. Peripherals never sit in a build.
    pub fn slot(&self) -> Option<BuildSlot> {
        match self {
            Self::Cpu => Some(BuildSlot::Cpu),
            Self::Motherboard => Some(BuildSlot::Motherboard),
            Self::Ram => Some(BuildSlot::Ram),
            Self::Gpu => Some(BuildSlot::Gpu),
            Self::Storage => Some(BuildSlot::Storage),
            Self::Psu => Some(BuildSlot::Psu),
            Self::Case => Some(BuildSlot::Case),
            Self::Cooler => Some(BuildSlot::Cooler),
            Self::Peripheral => None,
        }
    }

    /// Maps a free-form category tag onto a known category.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "cpu" | "processor" => Some(Self::Cpu),
            "mb" | "motherboard" | "mainboard" => Some(Self::Motherboard),
            "ram" | "memory" => Some(Self::Ram),
            "gpu" | "graphics" | "video-card" => Some(Self::Gpu),
            "storage" | "ssd" | "hdd" | "nvme" => Some(Self::Storage),
            "psu" | "power-supply" => Some(Self::Psu),
            "case" | "chassis" => Some(Self::Case),
            "cooler" | "cooling" | "aio" => Some(Self::Cooler),
            "peripheral" | "accessory" | "monitor" | "keyboard" | "mouse" => {
                Some(Self::Peripheral)
            }
            _ => None,
        }
    }
}

impl std::str::FromStr for PartCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown part category `{value}`"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolerKind {
    Air,
    Liquid,
}

/// Normalized hardware attributes. Which fields are meaningful depends on the part category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartSpecs {
    pub socket: Option<String>,
    pub chipset: Option<String>,
    pub ram_gen: Option<String>,
    pub max_memory_speed_mhz: Option<u32>,
    pub memory_speed_mhz: Option<u32>,
    pub capacity_gb: Option<u32>,
    pub tdp_w: Option<u32>,
    pub wattage_w: Option<u32>,
    pub gpu_length_mm: Option<u32>,
    pub max_gpu_length_mm: Option<u32>,
    pub supports_360_radiator: Option<bool>,
    pub cooler_kind: Option<CoolerKind>,
    pub radiator_mm: Option<u32>,
    pub compatible_sockets: Vec<String>,
    pub cooler_max_tdp_w: Option<u32>,
    pub pcie_gen: Option<u8>,
    pub pcie_x16_gen: Option<u8>,
    pub has_12vhpwr_connector: Option<bool>,
    pub fan_count: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PartRecord")]
pub struct Part {
    pub id: PartId,
    pub slug: String,
    pub name: String,
    pub category: PartCategory,
    pub price: Decimal,
    pub stock: u32,
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specs: PartSpecs,
}

/// Wire form of a part. Catalog identity may be omitted by build-check clients, and
/// specs may sit inline next to the identity fields instead of under `specs`.
#[derive(Debug, Deserialize)]
pub(crate) struct PartRecord {
    #[serde(default)]
    id: PartId,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: Option<PartCategory>,
    #[serde(default)]
    price: Decimal,
    #[serde(default)]
    stock: u32,
    #[serde(default = "listed")]
    active: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    specs: Option<PartSpecs>,
    #[serde(flatten)]
    inline_specs: PartSpecs,
}

fn listed() -> bool {
    true
}

impl PartRecord {
    /// Builds the part, using `slot_category` when the record names none.
    pub(crate) fn into_part(self, slot_category: PartCategory) -> Part {
        Part {
            id: self.id,
            slug: self.slug,
            name: self.name,
            category: self.category.unwrap_or(slot_category),
            price: self.price,
            stock: self.stock,
            active: self.active,
            tags: self.tags,
            specs: self.specs.unwrap_or(self.inline_specs),
        }
    }
}

impl TryFrom<PartRecord> for Part {
    type Error = String;

    fn try_from(record: PartRecord) -> Result<Self, Self::Error> {
        let category = record.category.ok_or_else(|| "missing field `category`".to_owned())?;
        Ok(record.into_part(category))
    }
}

impl Part {
    pub fn in_stock(&self) -> bool {
        self.active && self.stock > 0
    }

    pub fn is_liquid_cooler(&self) -> bool {
        self.category == PartCategory::Cooler
            && self.specs.cooler_kind == Some(CoolerKind::Liquid)
    }

    /// Lower-cased tag set, always including the part's own category.
    pub fn category_tags(&self) -> Vec<String> {
        let mut tags = vec![self.category.as_str().to_owned()];
        for tag in &self.tags {
            let normalized = tag.trim().to_ascii_lowercase();
            if !normalized.is_empty() && !tags.contains(&normalized) {
                tags.push(normalized);
            }
        }
        tags
    }
}
