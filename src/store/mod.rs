pub mod cluster_slice;
pub mod console_store;
pub mod selectors;
pub mod slice;
pub mod vm_slice;
