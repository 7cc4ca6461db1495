use crate::core::domain::{model::vm::VirtualMachine, value_object::serde_helpers::null_as_default};
use serde::Deserialize;

/// `data` payload of the list-by-owner endpoint: `{"vms": [...]}`.
#[derive(Debug, Deserialize)]
pub struct VmCollection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub vms: Vec<VirtualMachine>,
}
