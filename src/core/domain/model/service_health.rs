//! Health and service metadata reported by backend services.

use serde::{Deserialize, Serialize};

/// Result of a service health check.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthStatus {
    /// Service-reported status (e.g. `UP`, `ok`).
    pub status: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl HealthStatus {
    /// Whether the reported status reads as healthy.
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "up" | "ok" | "healthy" | "pass"
        )
    }
}

/// Descriptive metadata of a service.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ServiceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}
