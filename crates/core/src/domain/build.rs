use serde::{Deserialize, Serialize};

use crate::domain::part::{Part, PartCategory, PartRecord};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildSlot {
    Cpu,
    #[serde(rename = "mb")]
    Motherboard,
    Ram,
    Gpu,
    Storage,
    Psu,
    Case,
    Cooler,
}

impl BuildSlot {
    pub fn accepts(&self, category: PartCategory) -> bool {
        category.slot() == Some(*self)
    }
}

/// Sparse selection of parts under validation. `storage` is the only multi-valued slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BuildSnapshot")]
pub struct Build {
    pub cpu: Option<Part>,
    #[serde(rename = "mb", alias = "motherboard")]
    pub motherboard: Option<Part>,
    pub ram: Option<Part>,
    pub gpu: Option<Part>,
    pub storage: Vec<Part>,
    pub psu: Option<Part>,
    pub case: Option<Part>,
    pub cooler: Option<Part>,
}

/// Wire form of a build. Parts that omit `category` take the category of their slot.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BuildSnapshot {
    cpu: Option<PartRecord>,
    #[serde(alias = "motherboard")]
    mb: Option<PartRecord>,
    ram: Option<PartRecord>,
    gpu: Option<PartRecord>,
    storage: Vec<PartRecord>,
    psu: Option<PartRecord>,
    case: Option<PartRecord>,
    cooler: Option<PartRecord>,
}

impl From<BuildSnapshot> for Build {
    fn from(snapshot: BuildSnapshot) -> Self {
        let slot = |record: Option<PartRecord>, category: PartCategory| {
            record.map(|record| record.into_part(category))
        };
        Self {
            cpu: slot(snapshot.cpu, PartCategory::Cpu),
            motherboard: slot(snapshot.mb, PartCategory::Motherboard),
            ram: slot(snapshot.ram, PartCategory::Ram),
            gpu: slot(snapshot.gpu, PartCategory::Gpu),
            storage: snapshot
                .storage
                .into_iter()
                .map(|record| record.into_part(PartCategory::Storage))
                .collect(),
            psu: slot(snapshot.psu, PartCategory::Psu),
            case: slot(snapshot.case, PartCategory::Case),
            cooler: slot(snapshot.cooler, PartCategory::Cooler),
        }
    }
}

impl Build {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, slot: BuildSlot, part: Part) -> Result<Self, DomainError> {
        self.set_part(slot, part)?;
        Ok(self)
    }

    /// Places `part` in `slot`, replacing any previous selection. Storage appends.
    pub fn set_part(&mut self, slot: BuildSlot, part: Part) -> Result<(), DomainError> {
        if !slot.accepts(part.category) {
            return Err(DomainError::SlotMismatch { slot, category: part.category });
        }

        match slot {
            BuildSlot::Cpu => self.cpu = Some(part),
            BuildSlot::Motherboard => self.motherboard = Some(part),
            BuildSlot::Ram => self.ram = Some(part),
            BuildSlot::Gpu => self.gpu = Some(part),
            BuildSlot::Storage => self.storage.push(part),
            BuildSlot::Psu => self.psu = Some(part),
            BuildSlot::Case => self.case = Some(part),
            BuildSlot::Cooler => self.cooler = Some(part),
        }
        Ok(())
    }

    /// Clears `slot`; for storage this drops every selected device.
    pub fn remove_part(&mut self, slot: BuildSlot) {
        match slot {
            BuildSlot::Cpu => self.cpu = None,
            BuildSlot::Motherboard => self.motherboard = None,
            BuildSlot::Ram => self.ram = None,
            BuildSlot::Gpu => self.gpu = None,
            BuildSlot::Storage => self.storage.clear(),
            BuildSlot::Psu => self.psu = None,
            BuildSlot::Case => self.case = None,
            BuildSlot::Cooler => self.cooler = None,
        }
    }

    pub fn remove_storage(&mut self, index: usize) -> Option<Part> {
        (index < self.storage.len()).then(|| self.storage.remove(index))
    }

    pub fn storage(&self) -> &[Part] {
        &self.storage
    }

    pub fn get(&self, slot: BuildSlot) -> Option<&Part> {
        match slot {
            BuildSlot::Cpu => self.cpu.as_ref(),
            BuildSlot::Motherboard => self.motherboard.as_ref(),
            BuildSlot::Ram => self.ram.as_ref(),
            BuildSlot::Gpu => self.gpu.as_ref(),
            BuildSlot::Storage => self.storage.first(),
            BuildSlot::Psu => self.psu.as_ref(),
            BuildSlot::Case => self.case.as_ref(),
            BuildSlot::Cooler => self.cooler.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts().next().is_none()
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        [&self.cpu, &self.motherboard, &self.ram, &self.gpu]
            .into_iter()
            .flatten()
            .chain(self.storage.iter())
            .chain([&self.psu, &self.case, &self.cooler].into_iter().flatten())
    }
}
