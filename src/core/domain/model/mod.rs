pub mod cluster;
pub mod envelope;
pub mod service_health;
pub mod vm;
