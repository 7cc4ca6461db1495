//! Cluster slice: cached clusters, selection, placement and the request
//! lifecycle of every cluster operation.

use crate::{
    cluster::application::service::cluster_service::ClusterService,
    core::domain::{
        error::ConsoleResult,
        model::{
            cluster::{Cluster, ClusterPatch, NewCluster, PlacementDecision, SuitableHostRequest},
            service_health::{HealthStatus, ServiceInfo},
        },
    },
    store::slice::{Operation, OperationTracker, Slice, SliceFlags, SliceReducer},
};

/// Operations of the cluster slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterOperation {
    Health,
    ServiceInfo,
    FetchAll,
    FetchOne,
    FetchAvailable,
    Create,
    Update,
    Delete,
    FindSuitableHost,
}

impl Operation for ClusterOperation {
    /// Reads that fill a single slot. `FetchOne` may target different
    /// clusters at once, so every request of it is kept.
    fn is_supersedable(&self) -> bool {
        matches!(
            self,
            ClusterOperation::Health
                | ClusterOperation::ServiceInfo
                | ClusterOperation::FetchAll
                | ClusterOperation::FetchAvailable
                | ClusterOperation::FindSuitableHost
        )
    }
}

/// Fulfilled result of a cluster operation.
#[derive(Debug, Clone)]
pub enum ClusterPayload {
    Health(HealthStatus),
    ServiceInfo(ServiceInfo),
    All(Vec<Cluster>),
    One(Cluster),
    Available(Vec<Cluster>),
    Created(Cluster),
    Updated(Cluster),
    Deleted(u64),
    SuitableHost(PlacementDecision),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterState {
    pub(crate) clusters: Vec<Cluster>,
    pub(crate) available_clusters: Vec<Cluster>,
    pub(crate) selected_cluster: Option<Cluster>,
    pub(crate) suitable_host: Option<PlacementDecision>,
    pub(crate) health: Option<HealthStatus>,
    pub(crate) service_info: Option<ServiceInfo>,
    pub(crate) flags: SliceFlags,
    pub(crate) tracker: OperationTracker<ClusterOperation>,
}

impl ClusterState {
    fn replace_entry(&mut self, cluster: &Cluster) {
        if let Some(slot) = self.clusters.iter_mut().find(|c| c.id == cluster.id) {
            *slot = cluster.clone();
        }
        if let Some(slot) = self
            .available_clusters
            .iter_mut()
            .find(|c| c.id == cluster.id)
        {
            *slot = cluster.clone();
        }
    }

    /// Selects the cached cluster with `id`. Returns whether it was found.
    pub(crate) fn select(&mut self, id: u64) -> bool {
        let found = self
            .clusters
            .iter()
            .chain(self.available_clusters.iter())
            .find(|c| c.id == id)
            .cloned();
        let hit = found.is_some();
        self.selected_cluster = found;
        hit
    }
}

impl SliceReducer for ClusterState {
    type Operation = ClusterOperation;
    type Payload = ClusterPayload;

    fn flags(&self) -> &SliceFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut SliceFlags {
        &mut self.flags
    }

    fn tracker(&self) -> &OperationTracker<ClusterOperation> {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut OperationTracker<ClusterOperation> {
        &mut self.tracker
    }

    fn merge(&mut self, payload: ClusterPayload) -> bool {
        match payload {
            ClusterPayload::Health(health) => {
                self.health = Some(health);
                false
            }
            ClusterPayload::ServiceInfo(info) => {
                self.service_info = Some(info);
                false
            }
            ClusterPayload::All(clusters) => {
                self.clusters = clusters;
                false
            }
            ClusterPayload::Available(clusters) => {
                self.available_clusters = clusters;
                false
            }
            ClusterPayload::One(cluster) => {
                self.replace_entry(&cluster);
                self.selected_cluster = Some(cluster);
                false
            }
            ClusterPayload::Created(cluster) => {
                self.clusters.insert(0, cluster);
                true
            }
            ClusterPayload::Updated(cluster) => {
                self.replace_entry(&cluster);
                if self
                    .selected_cluster
                    .as_ref()
                    .is_some_and(|selected| selected.id == cluster.id)
                {
                    self.selected_cluster = Some(cluster);
                }
                false
            }
            ClusterPayload::Deleted(id) => {
                self.clusters.retain(|c| c.id != id);
                self.available_clusters.retain(|c| c.id != id);
                if self
                    .selected_cluster
                    .as_ref()
                    .is_some_and(|selected| selected.id == id)
                {
                    self.selected_cluster = None;
                }
                true
            }
            ClusterPayload::SuitableHost(decision) => {
                self.suitable_host = Some(decision);
                false
            }
        }
    }
}

/// Cluster operations run through the slice lifecycle.
///
/// Every method returns the API result as well, so callers can await the
/// outcome of their own request instead of reading the shared flags.
#[derive(Debug)]
pub struct ClusterSlice {
    service: ClusterService,
    slice: Slice<ClusterState>,
}

impl ClusterSlice {
    /// Empty slice over `service`.
    pub fn new(service: ClusterService) -> Self {
        Self {
            service,
            slice: Slice::new("clusters"),
        }
    }

    /// The service the slice calls, for requests that bypass the cache.
    pub fn service(&self) -> &ClusterService {
        &self.service
    }

    /// Returns a copy of the current state, or `None` once disposed.
    pub async fn snapshot(&self) -> Option<ClusterState> {
        self.slice.snapshot().await
    }

    /// Checks the cluster service and stores the reported health.
    ///
    /// # Errors
    /// Returns the adapter error, `ConsoleError::Cancelled` when superseded
    /// by a newer check, or `ConsoleError::Disposed`.
    pub async fn check_health(&self) -> ConsoleResult<HealthStatus> {
        self.slice
            .run(
                ClusterOperation::Health,
                self.service.health(),
                ClusterPayload::Health,
            )
            .await
    }

    /// Same lifecycle as [`ClusterSlice::check_health`], for the info endpoint.
    pub async fn fetch_service_info(&self) -> ConsoleResult<ServiceInfo> {
        self.slice
            .run(
                ClusterOperation::ServiceInfo,
                self.service.service_info(),
                ClusterPayload::ServiceInfo,
            )
            .await
    }

    /// Replaces the cached list. On failure the previous list is kept.
    ///
    /// # Errors
    /// Any adapter error. A newer list request cancels this one, which then
    /// returns `ConsoleError::Cancelled`.
    pub async fn fetch_clusters(&self) -> ConsoleResult<Vec<Cluster>> {
        self.slice
            .run(
                ClusterOperation::FetchAll,
                self.service.list_all(),
                ClusterPayload::All,
            )
            .await
    }

    /// Loads one cluster, selects it and refreshes its cached entry.
    ///
    /// Concurrent loads of different clusters all apply; the one that
    /// settles last ends up selected.
    ///
    /// # Errors
    /// Any adapter error, for example `Http` with status 404 for an unknown id.
    pub async fn fetch_cluster(&self, id: u64) -> ConsoleResult<Cluster> {
        self.slice
            .run(
                ClusterOperation::FetchOne,
                self.service.get_by_id(id),
                ClusterPayload::One,
            )
            .await
    }

    /// Replaces the cached list of clusters that can host new VMs.
    pub async fn fetch_available_clusters(&self) -> ConsoleResult<Vec<Cluster>> {
        self.slice
            .run(
                ClusterOperation::FetchAvailable,
                self.service.list_available(),
                ClusterPayload::Available,
            )
            .await
    }

    /// Creates a cluster and prepends it to the cached list.
    ///
    /// # Errors
    /// Any adapter error. A mutation is never superseded, so
    /// `ConsoleError::Cancelled` only follows an explicit cancel or reset.
    pub async fn create_cluster(&self, params: &NewCluster) -> ConsoleResult<Cluster> {
        self.slice
            .run(
                ClusterOperation::Create,
                self.service.create(params),
                ClusterPayload::Created,
            )
            .await
    }

    /// Applies a patch and replaces the cached entry (and the selection, if
    /// it is the same cluster) with the server's answer.
    ///
    /// # Errors
    /// Any adapter error.
    pub async fn update_cluster(&self, id: u64, patch: &ClusterPatch) -> ConsoleResult<Cluster> {
        self.slice
            .run(
                ClusterOperation::Update,
                self.service.update(id, patch),
                ClusterPayload::Updated,
            )
            .await
    }

    /// Deletes a cluster and drops it from both cached lists.
    ///
    /// # Errors
    /// Any adapter error. The cache is untouched on failure.
    pub async fn delete_cluster(&self, id: u64) -> ConsoleResult<()> {
        self.slice
            .run(ClusterOperation::Delete, self.service.delete(id), move |()| {
                ClusterPayload::Deleted(id)
            })
            .await
    }

    /// Asks for a placement. A rejection leaves the previous decision in place.
    ///
    /// # Errors
    /// Any adapter error; a 404 means no cluster has room for the request.
    pub async fn find_suitable_host(
        &self,
        request: &SuitableHostRequest,
    ) -> ConsoleResult<PlacementDecision> {
        self.slice
            .run(
                ClusterOperation::FindSuitableHost,
                self.service.find_suitable_host(request),
                ClusterPayload::SuitableHost,
            )
            .await
    }

    /// Selects a cached cluster. Returns `false` (and clears the selection)
    /// when no cached cluster has that id.
    pub async fn select(&self, id: u64) -> bool {
        self.slice.mutate(|state| state.select(id)).await
    }

    /// Drops the selected cluster.
    pub async fn clear_selection(&self) {
        self.slice
            .mutate(|state| state.selected_cluster = None)
            .await;
    }

    /// Forgets the last placement decision.
    pub async fn clear_suitable_host(&self) {
        self.slice.mutate(|state| state.suitable_host = None).await;
    }

    /// Clears the shared `error` flag.
    pub async fn clear_error(&self) {
        self.slice.clear_error().await;
    }

    /// Clears the shared `success` flag.
    pub async fn clear_success(&self) {
        self.slice.clear_success().await;
    }

    /// Cancels pending requests and restores the empty state.
    pub async fn reset(&self) {
        self.slice.reset().await;
    }

    /// Cancels the pending requests of one operation. Their callers get
    /// `ConsoleError::Cancelled`.
    pub async fn cancel(&self, operation: ClusterOperation) {
        self.slice.cancel(operation).await;
    }

    /// Cancels every pending cluster request.
    pub async fn cancel_all(&self) {
        self.slice.cancel_all().await;
    }

    pub(crate) fn dispose(&self) {
        self.slice.dispose();
    }
}
