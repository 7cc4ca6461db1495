pub mod vm_action_response;
pub mod vm_collection;
