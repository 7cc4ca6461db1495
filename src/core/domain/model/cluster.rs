//! Domain models for hosting clusters.
//!
//! A cluster advertises four capacity dimensions, each with a total and an
//! available quantity. The available quantity is lowered server-side as VMs
//! are placed, so it must never exceed the total.

use crate::core::domain::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cluster as returned by the cluster service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Cluster {
    /// Server-assigned identifier.
    pub id: u64,
    /// Display name.
    pub nom: String,
    /// Management address, when the backend exposes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adresse_ip: Option<String>,
    /// Total storage.
    #[serde(default)]
    pub rom: u64,
    /// Storage not yet allocated to VMs.
    #[serde(default)]
    pub available_rom: u64,
    /// Total memory.
    #[serde(default)]
    pub ram: u64,
    /// Memory not yet allocated to VMs.
    #[serde(default)]
    pub available_ram: u64,
    /// Total processors.
    #[serde(default)]
    pub processor: u64,
    /// Processors not yet allocated to VMs.
    #[serde(default)]
    pub available_processor: u64,
    /// Total cores.
    #[serde(default)]
    pub number_of_core: u64,
    /// Cores not yet allocated to VMs.
    #[serde(default)]
    pub available_number_of_core: u64,
}

/// One capacity dimension of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapacityDimension {
    Rom,
    Ram,
    Processor,
    Cores,
}

impl CapacityDimension {
    pub const ALL: [CapacityDimension; 4] = [
        CapacityDimension::Rom,
        CapacityDimension::Ram,
        CapacityDimension::Processor,
        CapacityDimension::Cores,
    ];

    /// Wire name of the total field.
    pub fn field_name(&self) -> &'static str {
        match self {
            CapacityDimension::Rom => "rom",
            CapacityDimension::Ram => "ram",
            CapacityDimension::Processor => "processor",
            CapacityDimension::Cores => "number_of_core",
        }
    }
}

impl fmt::Display for CapacityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Total and available quantity of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub total: u64,
    pub available: u64,
}

impl Capacity {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.available <= self.total
    }
}

impl Cluster {
    /// Returns the capacity of one dimension.
    pub fn capacity(&self, dimension: CapacityDimension) -> Capacity {
        let (total, available) = match dimension {
            CapacityDimension::Rom => (self.rom, self.available_rom),
            CapacityDimension::Ram => (self.ram, self.available_ram),
            CapacityDimension::Processor => (self.processor, self.available_processor),
            CapacityDimension::Cores => (self.number_of_core, self.available_number_of_core),
        };
        Capacity { total, available }
    }

    /// Dimensions whose available quantity exceeds the total.
    ///
    /// The backend does not enforce the invariant, so data read from it may
    /// violate it; consumers can surface the result instead of trusting it.
    pub fn capacity_violations(&self) -> Vec<CapacityDimension> {
        CapacityDimension::ALL
            .into_iter()
            .filter(|dimension| !self.capacity(*dimension).is_consistent())
            .collect()
    }
}

/// Capacity quantities sent on create and update. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapacityFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rom: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_rom: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_ram: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_processor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_core: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_number_of_core: Option<u64>,
}

impl CapacityFields {
    fn set(&mut self, dimension: CapacityDimension, total: u64, available: u64) {
        let (total_slot, available_slot) = self.slots_mut(dimension);
        *total_slot = Some(total);
        *available_slot = Some(available);
    }

    fn slots_mut(&mut self, dimension: CapacityDimension) -> (&mut Option<u64>, &mut Option<u64>) {
        match dimension {
            CapacityDimension::Rom => (&mut self.rom, &mut self.available_rom),
            CapacityDimension::Ram => (&mut self.ram, &mut self.available_ram),
            CapacityDimension::Processor => (&mut self.processor, &mut self.available_processor),
            CapacityDimension::Cores => (
                &mut self.number_of_core,
                &mut self.available_number_of_core,
            ),
        }
    }

    fn pair(&self, dimension: CapacityDimension) -> (Option<u64>, Option<u64>) {
        match dimension {
            CapacityDimension::Rom => (self.rom, self.available_rom),
            CapacityDimension::Ram => (self.ram, self.available_ram),
            CapacityDimension::Processor => (self.processor, self.available_processor),
            CapacityDimension::Cores => (self.number_of_core, self.available_number_of_core),
        }
    }

    fn is_empty(&self) -> bool {
        CapacityDimension::ALL
            .into_iter()
            .all(|dimension| self.pair(dimension) == (None, None))
    }

    /// Checks `available <= total` for every dimension where both are set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for dimension in CapacityDimension::ALL {
            if let (Some(total), Some(available)) = self.pair(dimension) {
                if available > total {
                    return Err(ValidationError::ConstraintViolation(format!(
                        "available_{} ({}) cannot exceed {} ({})",
                        dimension, available, dimension, total
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parameters for creating a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCluster {
    pub nom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse_ip: Option<String>,
    #[serde(flatten)]
    pub capacity: CapacityFields,
}

impl NewCluster {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            adresse_ip: None,
            capacity: CapacityFields::default(),
        }
    }

    pub fn with_address(mut self, adresse_ip: impl Into<String>) -> Self {
        self.adresse_ip = Some(adresse_ip.into());
        self
    }

    pub fn with_rom(mut self, total: u64, available: u64) -> Self {
        self.capacity.set(CapacityDimension::Rom, total, available);
        self
    }

    pub fn with_ram(mut self, total: u64, available: u64) -> Self {
        self.capacity.set(CapacityDimension::Ram, total, available);
        self
    }

    pub fn with_processor(mut self, total: u64, available: u64) -> Self {
        self.capacity.set(CapacityDimension::Processor, total, available);
        self
    }

    pub fn with_cores(mut self, total: u64, available: u64) -> Self {
        self.capacity.set(CapacityDimension::Cores, total, available);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.nom.trim().is_empty() {
            return Err(ValidationError::field("nom", "Cluster name cannot be empty"));
        }
        self.capacity.validate()
    }
}

/// Partial update of a cluster. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse_ip: Option<String>,
    #[serde(flatten)]
    pub capacity: CapacityFields,
}

impl ClusterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nom(mut self, nom: impl Into<String>) -> Self {
        self.nom = Some(nom.into());
        self
    }

    pub fn adresse_ip(mut self, adresse_ip: impl Into<String>) -> Self {
        self.adresse_ip = Some(adresse_ip.into());
        self
    }

    pub fn capacity(mut self, dimension: CapacityDimension, total: u64, available: u64) -> Self {
        self.capacity.set(dimension, total, available);
        self
    }

    /// Sets only the available quantity of one dimension.
    pub fn available(mut self, dimension: CapacityDimension, available: u64) -> Self {
        *self.capacity.slots_mut(dimension).1 = Some(available);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.nom.is_none() && self.adresse_ip.is_none() && self.capacity.is_empty() {
            return Err(ValidationError::ConstraintViolation(
                "Cluster patch must change at least one field".to_string(),
            ));
        }
        if self.nom.as_deref().is_some_and(|nom| nom.trim().is_empty()) {
            return Err(ValidationError::field("nom", "Cluster name cannot be empty"));
        }
        self.capacity.validate()
    }
}

/// Resource requirements submitted to the placement endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuitableHostRequest {
    pub rom: u64,
    pub ram: u64,
    pub processor: u64,
    pub number_of_core: u64,
}

impl SuitableHostRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rom == 0 && self.ram == 0 && self.processor == 0 && self.number_of_core == 0 {
            return Err(ValidationError::ConstraintViolation(
                "Placement request must require at least one resource".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server-computed assignment of a resource request to a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlacementDecision {
    /// The cluster chosen to host the request.
    pub service_cluster_id: u64,
    /// Display name of the chosen cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    /// Host address inside the cluster, when the backend picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    /// Free-form explanation from the scheduler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
