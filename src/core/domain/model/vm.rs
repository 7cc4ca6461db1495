//! Domain models for virtual machines hosted by the VM-host service.

use crate::core::domain::{
    error::ValidationError,
    value_object::{Identifier, validate_identifier},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a virtual machine.
///
/// `provisioning -> running <-> stopped -> deleted`, with `paused` observed
/// on degraded hosts and `error` reachable from anywhere. Values the server
/// reports that are not in this list decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    Provisioning,
    Running,
    Stopped,
    Paused,
    Error,
    Deleted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl VmStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `Unknown` allows everything since the real status is not known.
    pub fn can_transition_to(&self, next: VmStatus) -> bool {
        use VmStatus::*;

        if next == Error {
            return *self != Deleted;
        }
        match self {
            Provisioning => matches!(next, Running | Stopped),
            Running => matches!(next, Stopped | Paused),
            Stopped => matches!(next, Running | Deleted),
            Paused => matches!(next, Running | Stopped),
            Error => matches!(next, Running | Stopped | Deleted),
            Deleted => false,
            Unknown => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VmStatus::Provisioning => "provisioning",
            VmStatus::Running => "running",
            VmStatus::Stopped => "stopped",
            VmStatus::Paused => "paused",
            VmStatus::Error => "error",
            VmStatus::Deleted => "deleted",
            VmStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A virtual machine as returned by the VM-host service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VirtualMachine {
    pub id: Identifier,
    pub name: String,
    /// Owner of the VM.
    pub user_id: Identifier,
    /// Cluster the VM is placed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_cluster_id: Option<u64>,
    #[serde(default)]
    pub cpu_count: u32,
    #[serde(default)]
    pub memory_size_mib: u64,
    #[serde(default)]
    pub disk_size_gb: u64,
    #[serde(default)]
    pub vm_ip: Option<String>,
    #[serde(default)]
    pub vm_mac: Option<String>,
    #[serde(default)]
    pub tap_device: Option<String>,
    #[serde(default)]
    pub tap_ip: Option<String>,
    #[serde(default)]
    pub status: VmStatus,
}

/// Parameters for creating a VM.
///
/// `user_id`, `vm_offer_id` and `system_image_id` always serialize as JSON
/// strings, whatever integer type they were built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateVmParams {
    pub name: String,
    pub user_id: Identifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_cluster_id: Option<u64>,
    pub vm_offer_id: Identifier,
    pub system_image_id: Identifier,
    pub cpu_count: u32,
    pub memory_size_mib: u64,
    pub disk_size_gb: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_public_key: Option<String>,
}

impl CreateVmParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::field("name", "VM name cannot be empty"));
        }
        validate_identifier("user_id", &self.user_id)?;
        validate_identifier("vm_offer_id", &self.vm_offer_id)?;
        validate_identifier("system_image_id", &self.system_image_id)?;
        if self.cpu_count == 0 {
            return Err(ValidationError::field("cpu_count", "At least one vCPU is required"));
        }
        if self.memory_size_mib == 0 {
            return Err(ValidationError::field(
                "memory_size_mib",
                "Memory size must be positive",
            ));
        }
        if self.disk_size_gb == 0 {
            return Err(ValidationError::field("disk_size_gb", "Disk size must be positive"));
        }
        Ok(())
    }
}

/// Body of the start, stop, delete and status calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmActionRequest {
    pub user_id: Identifier,
    pub vm_id: Identifier,
}

impl VmActionRequest {
    pub fn new(user_id: impl Into<Identifier>, vm_id: impl Into<Identifier>) -> Self {
        Self {
            user_id: user_id.into(),
            vm_id: vm_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identifier("user_id", &self.user_id)?;
        validate_identifier("vm_id", &self.vm_id)
    }
}

/// Outcome of a start or stop call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmActionResult {
    pub vm_id: Identifier,
    /// Status reported by the server, if any.
    pub status: Option<VmStatus>,
    pub message: Option<String>,
}

/// Server-reported status of one VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmStatusReport {
    pub vm_id: Identifier,
    pub status: VmStatus,
}

/// Resource usage of one VM.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct VmMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage_mib: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_usage_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_rx_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_tx_bytes: Option<u64>,
    /// Any additional counters the host reports.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
