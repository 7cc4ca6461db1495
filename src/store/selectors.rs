//! Read-only accessors over slice snapshots.
//!
//! Every selector accepts an absent slice and answers with an empty list,
//! `None`, `false` or [`OperationStatus::Idle`].

use crate::{
    core::domain::{
        error::NormalizedError,
        model::{
            cluster::{Cluster, PlacementDecision},
            service_health::{HealthStatus, ServiceInfo},
            vm::{VirtualMachine, VmMetrics, VmStatusReport},
        },
    },
    store::{
        cluster_slice::{ClusterOperation, ClusterState},
        slice::{OperationStatus, SliceFlags, SliceReducer},
        vm_slice::{VmOperation, VmState},
    },
};

/// Snapshot of every slice of a store. A slice is `None` once the store
/// has been disposed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    pub clusters: Option<ClusterState>,
    pub vms: Option<VmState>,
}

impl RootState {
    pub fn clusters(&self) -> Option<&ClusterState> {
        self.clusters.as_ref()
    }

    pub fn vms(&self) -> Option<&VmState> {
        self.vms.as_ref()
    }

    /// Whether any slice has a request in flight.
    pub fn is_any_loading(&self) -> bool {
        select_cluster_loading(self.clusters()) || select_vm_loading(self.vms())
    }

    /// Errors of every slice that currently holds one.
    pub fn errors(&self) -> Vec<&NormalizedError> {
        select_cluster_error(self.clusters())
            .into_iter()
            .chain(select_vm_error(self.vms()))
            .collect()
    }
}

fn flags<S: SliceReducer>(state: Option<&S>) -> Option<&SliceFlags> {
    state.map(|s| s.flags())
}

// Clusters

pub fn select_clusters(state: Option<&ClusterState>) -> &[Cluster] {
    state.map(|s| s.clusters.as_slice()).unwrap_or_default()
}

pub fn select_available_clusters(state: Option<&ClusterState>) -> &[Cluster] {
    state
        .map(|s| s.available_clusters.as_slice())
        .unwrap_or_default()
}

pub fn select_selected_cluster(state: Option<&ClusterState>) -> Option<&Cluster> {
    state.and_then(|s| s.selected_cluster.as_ref())
}

pub fn select_cluster_by_id(state: Option<&ClusterState>, id: u64) -> Option<&Cluster> {
    select_clusters(state).iter().find(|c| c.id == id)
}

pub fn select_suitable_host(state: Option<&ClusterState>) -> Option<&PlacementDecision> {
    state.and_then(|s| s.suitable_host.as_ref())
}

pub fn select_cluster_health(state: Option<&ClusterState>) -> Option<&HealthStatus> {
    state.and_then(|s| s.health.as_ref())
}

pub fn select_cluster_service_info(state: Option<&ClusterState>) -> Option<&ServiceInfo> {
    state.and_then(|s| s.service_info.as_ref())
}

pub fn select_cluster_loading(state: Option<&ClusterState>) -> bool {
    flags(state).is_some_and(|f| f.is_loading)
}

pub fn select_cluster_error(state: Option<&ClusterState>) -> Option<&NormalizedError> {
    flags(state).and_then(|f| f.error.as_ref())
}

pub fn select_cluster_success(state: Option<&ClusterState>) -> bool {
    flags(state).is_some_and(|f| f.success)
}

pub fn select_cluster_operation_status(
    state: Option<&ClusterState>,
    operation: ClusterOperation,
) -> OperationStatus {
    state
        .map(|s| s.tracker.operation_status(operation))
        .unwrap_or_default()
}

// VMs

pub fn select_vms(state: Option<&VmState>) -> &[VirtualMachine] {
    state.map(|s| s.vms.as_slice()).unwrap_or_default()
}

pub fn select_selected_vm(state: Option<&VmState>) -> Option<&VirtualMachine> {
    state.and_then(|s| s.selected_vm.as_ref())
}

pub fn select_vm_by_id<'a>(state: Option<&'a VmState>, vm_id: &str) -> Option<&'a VirtualMachine> {
    select_vms(state).iter().find(|vm| vm.id.as_str() == vm_id)
}

pub fn select_vm_last_status(state: Option<&VmState>) -> Option<&VmStatusReport> {
    state.and_then(|s| s.last_status.as_ref())
}

pub fn select_vm_metrics(state: Option<&VmState>) -> Option<&VmMetrics> {
    state.and_then(|s| s.metrics.as_ref())
}

pub fn select_vm_health(state: Option<&VmState>) -> Option<&HealthStatus> {
    state.and_then(|s| s.health.as_ref())
}

pub fn select_vm_loading(state: Option<&VmState>) -> bool {
    flags(state).is_some_and(|f| f.is_loading)
}

pub fn select_vm_error(state: Option<&VmState>) -> Option<&NormalizedError> {
    flags(state).and_then(|f| f.error.as_ref())
}

pub fn select_vm_success(state: Option<&VmState>) -> bool {
    flags(state).is_some_and(|f| f.success)
}

pub fn select_vm_operation_status(
    state: Option<&VmState>,
    operation: VmOperation,
) -> OperationStatus {
    state
        .map(|s| s.tracker.operation_status(operation))
        .unwrap_or_default()
}
