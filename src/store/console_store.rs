use crate::{
    cluster::application::service::cluster_service::ClusterService,
    core::infrastructure::api_client::ApiClient,
    store::{cluster_slice::ClusterSlice, selectors::RootState, vm_slice::VmSlice},
    vm_host::application::service::vm_host_service::VmHostService,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Root of the client-side state: one slice per backend domain.
///
/// Created with [`ConsoleStore::init`] and torn down with
/// [`ConsoleStore::dispose`], which cancels every in-flight request and
/// makes further operations fail with `ConsoleError::Disposed`.
#[derive(Debug)]
pub struct ConsoleStore {
    clusters: ClusterSlice,
    vms: VmSlice,
    disposed: AtomicBool,
}

impl ConsoleStore {
    pub fn init(client: Arc<ApiClient>) -> Self {
        let clusters = ClusterSlice::new(ClusterService::new(Arc::clone(&client)));
        let vms = VmSlice::new(VmHostService::new(Arc::clone(&client)));

        info!(
            base_url = %client.config().base_url().as_str(),
            cluster_service = %client.config().cluster_service(),
            vm_host_service = %client.config().vm_host_service(),
            "console store initialised"
        );

        Self {
            clusters,
            vms,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn clusters(&self) -> &ClusterSlice {
        &self.clusters
    }

    pub fn vms(&self) -> &VmSlice {
        &self.vms
    }

    /// Snapshot of every slice.
    pub async fn snapshot(&self) -> RootState {
        RootState {
            clusters: self.clusters.snapshot().await,
            vms: self.vms.snapshot().await,
        }
    }

    /// Cancels pending requests of every slice and refuses new ones.
    /// Calling it more than once is a no-op.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.clusters.dispose();
        self.vms.dispose();
        info!("console store disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Drop for ConsoleStore {
    fn drop(&mut self) {
        self.dispose();
    }
}
