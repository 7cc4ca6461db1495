use crate::core::domain::{model::vm::VmStatus, value_object::Identifier};
use serde::Deserialize;

/// `data` payload of the start and stop endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct VmActionResponse {
    #[serde(default)]
    pub vm_id: Option<Identifier>,
    #[serde(default)]
    pub status: Option<VmStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` payload of the status endpoint.
#[derive(Debug, Deserialize)]
pub struct VmStatusResponse {
    #[serde(default)]
    pub vm_id: Option<Identifier>,
    pub status: VmStatus,
}
