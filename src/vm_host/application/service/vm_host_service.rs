//! VM-host service operations.

use crate::{
    core::{
        domain::{
            error::ConsoleResult,
            model::{
                envelope::DataEnvelope,
                service_health::HealthStatus,
                vm::{
                    CreateVmParams, VirtualMachine, VmActionRequest, VmActionResult, VmMetrics,
                    VmStatusReport,
                },
            },
            value_object::{Identifier, ServiceName, validate_identifier},
        },
        infrastructure::api_client::ApiClient,
    },
    vm_host::application::response::{
        vm_action_response::{VmActionResponse, VmStatusResponse},
        vm_collection::VmCollection,
    },
};
use serde::de::IgnoredAny;
use std::sync::Arc;
use tracing::debug;

const API: &str = "api";
const RESOURCE: &str = "service-vm-host";
const VM: &str = "vm";

/// Typed operations of the VM-host service.
///
/// Lifecycle calls (start, stop, delete, status) all POST
/// `{"user_id", "vm_id"}` with both identifiers in string form.
#[derive(Debug, Clone)]
pub struct VmHostService {
    client: Arc<ApiClient>,
    service: ServiceName,
}

impl VmHostService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let service = client.config().vm_host_service().clone();
        Self { client, service }
    }

    pub async fn health(&self) -> ConsoleResult<HealthStatus> {
        self.client.get(&self.service, &["health"]).await
    }

    pub async fn list_by_owner(&self, user_id: &Identifier) -> ConsoleResult<Vec<VirtualMachine>> {
        validate_identifier("user_id", user_id)?;
        let envelope: DataEnvelope<VmCollection> = self
            .client
            .get(&self.service, &[API, RESOURCE, "user", user_id.as_str()])
            .await?;
        Ok(envelope.data.vms)
    }

    /// # Errors
    /// Returns `ConsoleError::Validation` without sending anything when the
    /// parameters are incomplete.
    pub async fn create(&self, params: &CreateVmParams) -> ConsoleResult<VirtualMachine> {
        params.validate()?;
        let envelope: DataEnvelope<VirtualMachine> = self
            .client
            .post(&self.service, &[API, RESOURCE, VM, "create"], params)
            .await?;
        debug!(vm_id = %envelope.data.id, message = ?envelope.message, "vm created");
        Ok(envelope.data)
    }

    pub async fn start(&self, request: &VmActionRequest) -> ConsoleResult<VmActionResult> {
        self.lifecycle_action("start", request).await
    }

    pub async fn stop(&self, request: &VmActionRequest) -> ConsoleResult<VmActionResult> {
        self.lifecycle_action("stop", request).await
    }

    pub async fn delete(&self, request: &VmActionRequest) -> ConsoleResult<()> {
        request.validate()?;
        let _: IgnoredAny = self
            .client
            .post(&self.service, &[API, RESOURCE, VM, "delete"], request)
            .await?;
        debug!(vm_id = %request.vm_id, "vm deleted");
        Ok(())
    }

    pub async fn status(&self, request: &VmActionRequest) -> ConsoleResult<VmStatusReport> {
        request.validate()?;
        let envelope: DataEnvelope<VmStatusResponse> = self
            .client
            .post(&self.service, &[API, RESOURCE, VM, "status"], request)
            .await?;
        Ok(VmStatusReport {
            vm_id: envelope.data.vm_id.unwrap_or_else(|| request.vm_id.clone()),
            status: envelope.data.status,
        })
    }

    /// Fetches usage counters of the VM named `vm_name` owned by `user_id`.
    pub async fn metrics(&self, user_id: &Identifier, vm_name: &str) -> ConsoleResult<VmMetrics> {
        validate_identifier("user_id", user_id)?;
        validate_identifier("vm_name", &Identifier::from(vm_name))?;
        let envelope: DataEnvelope<VmMetrics> = self
            .client
            .get(
                &self.service,
                &[API, RESOURCE, VM, user_id.as_str(), vm_name, "metrics"],
            )
            .await?;
        Ok(envelope.data)
    }

    async fn lifecycle_action(
        &self,
        action: &str,
        request: &VmActionRequest,
    ) -> ConsoleResult<VmActionResult> {
        request.validate()?;
        let envelope: DataEnvelope<Option<VmActionResponse>> = self
            .client
            .post(&self.service, &[API, RESOURCE, VM, action], request)
            .await?;
        let response = envelope.data.unwrap_or_default();
        Ok(VmActionResult {
            vm_id: response.vm_id.unwrap_or_else(|| request.vm_id.clone()),
            status: response.status,
            message: response.message.or(envelope.message),
        })
    }
}
