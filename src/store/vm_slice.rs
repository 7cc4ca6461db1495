//! VM slice: the VMs of one owner, their lifecycle actions and status.

use crate::{
    core::domain::{
        error::{ConsoleResult, ValidationError},
        model::{
            service_health::HealthStatus,
            vm::{
                CreateVmParams, VirtualMachine, VmActionRequest, VmActionResult, VmMetrics,
                VmStatus, VmStatusReport,
            },
        },
        value_object::Identifier,
    },
    store::slice::{Operation, OperationTracker, Slice, SliceFlags, SliceReducer},
    vm_host::application::service::vm_host_service::VmHostService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VmOperation {
    Health,
    FetchByOwner,
    Create,
    Start,
    Stop,
    Delete,
    Status,
    Metrics,
}

impl Operation for VmOperation {
    /// Status and metrics polls target one VM each and run side by side.
    fn is_supersedable(&self) -> bool {
        matches!(self, VmOperation::Health | VmOperation::FetchByOwner)
    }
}

#[derive(Debug, Clone)]
pub enum VmPayload {
    Health(HealthStatus),
    Owned(Vec<VirtualMachine>),
    Created(VirtualMachine),
    /// Result of start or stop, with the status assumed when the server
    /// does not report one.
    Lifecycle {
        result: VmActionResult,
        assumed: VmStatus,
    },
    Deleted(Identifier),
    Status(VmStatusReport),
    Metrics(VmMetrics),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmState {
    pub(crate) vms: Vec<VirtualMachine>,
    pub(crate) selected_vm: Option<VirtualMachine>,
    pub(crate) last_status: Option<VmStatusReport>,
    pub(crate) metrics: Option<VmMetrics>,
    pub(crate) health: Option<HealthStatus>,
    pub(crate) flags: SliceFlags,
    pub(crate) tracker: OperationTracker<VmOperation>,
}

impl VmState {
    fn set_status(&mut self, vm_id: &Identifier, status: VmStatus) {
        if let Some(vm) = self.vms.iter_mut().find(|vm| &vm.id == vm_id) {
            vm.status = status;
        }
        if let Some(vm) = self.selected_vm.as_mut().filter(|vm| &vm.id == vm_id) {
            vm.status = status;
        }
    }

    fn known_status(&self, vm_id: &Identifier) -> Option<VmStatus> {
        self.vms
            .iter()
            .find(|vm| &vm.id == vm_id)
            .map(|vm| vm.status)
    }

    pub(crate) fn select(&mut self, vm_id: &Identifier) -> bool {
        self.selected_vm = self.vms.iter().find(|vm| &vm.id == vm_id).cloned();
        self.selected_vm.is_some()
    }
}

impl SliceReducer for VmState {
    type Operation = VmOperation;
    type Payload = VmPayload;

    fn flags(&self) -> &SliceFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut SliceFlags {
        &mut self.flags
    }

    fn tracker(&self) -> &OperationTracker<VmOperation> {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut OperationTracker<VmOperation> {
        &mut self.tracker
    }

    fn merge(&mut self, payload: VmPayload) -> bool {
        match payload {
            VmPayload::Health(health) => {
                self.health = Some(health);
                false
            }
            VmPayload::Owned(vms) => {
                self.vms = vms;
                false
            }
            VmPayload::Created(mut vm) => {
                if vm.status == VmStatus::Unknown {
                    vm.status = VmStatus::Provisioning;
                }
                self.vms.insert(0, vm);
                true
            }
            VmPayload::Lifecycle { result, assumed } => {
                self.set_status(&result.vm_id, result.status.unwrap_or(assumed));
                true
            }
            VmPayload::Deleted(vm_id) => {
                self.vms.retain(|vm| vm.id != vm_id);
                if self
                    .selected_vm
                    .as_ref()
                    .is_some_and(|vm| vm.id == vm_id)
                {
                    self.selected_vm = None;
                }
                true
            }
            VmPayload::Status(report) => {
                self.set_status(&report.vm_id, report.status);
                self.last_status = Some(report);
                false
            }
            VmPayload::Metrics(metrics) => {
                self.metrics = Some(metrics);
                false
            }
        }
    }
}

/// Rejects a start or stop the cached status says cannot happen.
fn ensure_transition(current: Option<VmStatus>, target: VmStatus) -> Result<(), ValidationError> {
    match current {
        Some(current) if current != target && !current.can_transition_to(target) => {
            Err(ValidationError::ConstraintViolation(format!(
                "VM cannot move from {current} to {target}"
            )))
        }
        _ => Ok(()),
    }
}

/// VM operations run through the slice lifecycle.
#[derive(Debug)]
pub struct VmSlice {
    service: VmHostService,
    slice: Slice<VmState>,
}

impl VmSlice {
    /// Empty slice over `service`.
    pub fn new(service: VmHostService) -> Self {
        Self {
            service,
            slice: Slice::new("vms"),
        }
    }

    /// The underlying VM-host service.
    pub fn service(&self) -> &VmHostService {
        &self.service
    }

    /// Copy of the current state; `None` after dispose.
    pub async fn snapshot(&self) -> Option<VmState> {
        self.slice.snapshot().await
    }

    /// Checks the VM-host service. A newer check supersedes this one.
    ///
    /// # Errors
    /// The adapter error, or `ConsoleError::Cancelled` once superseded.
    pub async fn check_health(&self) -> ConsoleResult<HealthStatus> {
        self.slice
            .run(VmOperation::Health, self.service.health(), VmPayload::Health)
            .await
    }

    /// Replaces the cached list with the VMs of `user_id`.
    ///
    /// # Errors
    /// Any adapter error, leaving the previous list cached. Returns
    /// `ConsoleError::Cancelled` when a newer list request supersedes it.
    pub async fn fetch_vms(&self, user_id: &Identifier) -> ConsoleResult<Vec<VirtualMachine>> {
        self.slice
            .run(
                VmOperation::FetchByOwner,
                self.service.list_by_owner(user_id),
                VmPayload::Owned,
            )
            .await
    }

    /// Creates a VM and puts it first in the cached list. A VM the server
    /// returns without a status is cached as provisioning.
    ///
    /// # Errors
    /// Any adapter error.
    pub async fn create_vm(&self, params: &CreateVmParams) -> ConsoleResult<VirtualMachine> {
        self.slice
            .run(
                VmOperation::Create,
                self.service.create(params),
                VmPayload::Created,
            )
            .await
    }

    /// Starts a VM. Without a status in the answer, it is assumed running.
    ///
    /// # Errors
    /// Fails with `ConsoleError::Validation`, without a request, when the
    /// cached status of the VM cannot move to running. Otherwise any
    /// adapter error.
    pub async fn start_vm(&self, request: &VmActionRequest) -> ConsoleResult<VmActionResult> {
        self.lifecycle(VmOperation::Start, VmStatus::Running, request)
            .await
    }

    /// Counterpart of [`VmSlice::start_vm`], towards stopped.
    ///
    /// # Errors
    /// `ConsoleError::Validation` when the cached status cannot move to
    /// stopped, or the adapter error.
    pub async fn stop_vm(&self, request: &VmActionRequest) -> ConsoleResult<VmActionResult> {
        self.lifecycle(VmOperation::Stop, VmStatus::Stopped, request)
            .await
    }

    /// Deletes a VM, drops it from the cache and clears it if selected.
    ///
    /// # Errors
    /// Any adapter error.
    pub async fn delete_vm(&self, request: &VmActionRequest) -> ConsoleResult<()> {
        let vm_id = request.vm_id.clone();
        self.slice
            .run(VmOperation::Delete, self.service.delete(request), move |()| {
                VmPayload::Deleted(vm_id)
            })
            .await
    }

    /// Polls the status of one VM and writes it into the cached entry.
    /// Polls for different VMs may run concurrently.
    ///
    /// # Errors
    /// Any adapter error.
    pub async fn fetch_vm_status(&self, request: &VmActionRequest) -> ConsoleResult<VmStatusReport> {
        self.slice
            .run(
                VmOperation::Status,
                self.service.status(request),
                VmPayload::Status,
            )
            .await
    }

    /// Loads the metrics of one VM into the metrics slot.
    ///
    /// # Errors
    /// Any adapter error.
    pub async fn fetch_vm_metrics(
        &self,
        user_id: &Identifier,
        vm_name: &str,
    ) -> ConsoleResult<VmMetrics> {
        self.slice
            .run(
                VmOperation::Metrics,
                self.service.metrics(user_id, vm_name),
                VmPayload::Metrics,
            )
            .await
    }

    async fn lifecycle(
        &self,
        operation: VmOperation,
        target: VmStatus,
        request: &VmActionRequest,
    ) -> ConsoleResult<VmActionResult> {
        let current = self
            .slice
            .mutate(|state| state.known_status(&request.vm_id))
            .await;

        let call = async move {
            ensure_transition(current, target)?;
            match operation {
                VmOperation::Start => self.service.start(request).await,
                _ => self.service.stop(request).await,
            }
        };

        self.slice
            .run(operation, call, move |result| VmPayload::Lifecycle {
                result,
                assumed: target,
            })
            .await
    }

    /// Selects a cached VM. Returns `false` and clears the selection when
    /// it is not cached.
    pub async fn select(&self, vm_id: &Identifier) -> bool {
        self.slice.mutate(|state| state.select(vm_id)).await
    }

    /// Drops the selected VM.
    pub async fn clear_selection(&self) {
        self.slice.mutate(|state| state.selected_vm = None).await;
    }

    /// Clears the shared `error` flag.
    pub async fn clear_error(&self) {
        self.slice.clear_error().await;
    }

    /// Clears the shared `success` flag, e.g. after a toast was shown.
    pub async fn clear_success(&self) {
        self.slice.clear_success().await;
    }

    /// Cancels pending requests and empties the slice.
    pub async fn reset(&self) {
        self.slice.reset().await;
    }

    /// Cancels every pending request of `operation`.
    pub async fn cancel(&self, operation: VmOperation) {
        self.slice.cancel(operation).await;
    }

    /// Cancels every pending VM request.
    pub async fn cancel_all(&self) {
        self.slice.cancel_all().await;
    }

    pub(crate) fn dispose(&self) {
        self.slice.dispose();
    }
}
