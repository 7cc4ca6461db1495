pub mod vm_host_service;
