mod resources;

use crate::{
    ApiClient, BaseUrl, ClusterService, ConsoleConfig, ConsoleStore, VmHostService,
    core::infrastructure::auth_provider::Anonymous,
};
use std::sync::Arc;
use wiremock::MockServer;

pub(crate) fn create_test_client(mock_server: &MockServer) -> Arc<ApiClient> {
    let config = ConsoleConfig::new(BaseUrl::parse(&mock_server.uri()).unwrap());
    Arc::new(ApiClient::new(config, Arc::new(Anonymous)).unwrap())
}

pub(crate) fn cluster_service(mock_server: &MockServer) -> ClusterService {
    ClusterService::new(create_test_client(mock_server))
}

pub(crate) fn vm_host_service(mock_server: &MockServer) -> VmHostService {
    VmHostService::new(create_test_client(mock_server))
}

pub(crate) fn create_test_store(mock_server: &MockServer) -> ConsoleStore {
    ConsoleStore::init(create_test_client(mock_server))
}

pub(crate) fn cluster_json(id: u64, nom: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "nom": nom,
        "adresse_ip": "10.0.0.1",
        "rom": 1000,
        "available_rom": 600,
        "ram": 256,
        "available_ram": 128,
        "processor": 16,
        "available_processor": 8,
        "number_of_core": 64,
        "available_number_of_core": 32
    })
}

pub(crate) fn vm_json(id: u64, name: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "user_id": 42,
        "service_cluster_id": 1,
        "cpu_count": 2,
        "memory_size_mib": 2048,
        "disk_size_gb": 20,
        "vm_ip": "192.168.100.10",
        "vm_mac": "52:54:00:12:34:56",
        "tap_device": "tap0",
        "tap_ip": "192.168.100.1",
        "status": status
    })
}
