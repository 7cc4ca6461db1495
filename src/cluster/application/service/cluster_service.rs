//! Cluster service operations.

use crate::{
    cluster::application::response::cluster_collection::ClusterCollection,
    core::{
        domain::{
            error::ConsoleResult,
            model::{
                cluster::{Cluster, ClusterPatch, NewCluster, PlacementDecision, SuitableHostRequest},
                envelope::DataEnvelope,
                service_health::{HealthStatus, ServiceInfo},
            },
            value_object::ServiceName,
        },
        infrastructure::api_client::ApiClient,
    },
};
use serde::de::IgnoredAny;
use std::sync::Arc;
use tracing::debug;

const API: &str = "api";
const RESOURCE: &str = "service-clusters";

/// Typed operations of the cluster service.
///
/// Stateless: every call builds its path under
/// `/{service}/api/service-clusters` and delegates to the [`ApiClient`].
/// Reads are safe to retry; create, update and delete are not idempotent.
#[derive(Debug, Clone)]
pub struct ClusterService {
    client: Arc<ApiClient>,
    service: ServiceName,
}

impl ClusterService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let service = client.config().cluster_service().clone();
        Self { client, service }
    }

    pub async fn health(&self) -> ConsoleResult<HealthStatus> {
        self.client
            .get(&self.service, &[API, RESOURCE, "health"])
            .await
    }

    pub async fn service_info(&self) -> ConsoleResult<ServiceInfo> {
        self.client.get(&self.service, &[API, RESOURCE, "info"]).await
    }

    /// Lists every cluster in server order.
    pub async fn list_all(&self) -> ConsoleResult<Vec<Cluster>> {
        let envelope: DataEnvelope<ClusterCollection> =
            self.client.get(&self.service, &[API, RESOURCE, ""]).await?;
        Ok(envelope.data.clusters)
    }

    pub async fn get_by_id(&self, id: u64) -> ConsoleResult<Cluster> {
        let id = id.to_string();
        let envelope: DataEnvelope<Cluster> =
            self.client.get(&self.service, &[API, RESOURCE, &id]).await?;
        Ok(envelope.data)
    }

    /// Lists clusters that still have free capacity.
    pub async fn list_available(&self) -> ConsoleResult<Vec<Cluster>> {
        let envelope: DataEnvelope<ClusterCollection> = self
            .client
            .get(&self.service, &[API, RESOURCE, "available"])
            .await?;
        Ok(envelope.data.clusters)
    }

    /// # Errors
    /// Returns `ConsoleError::Validation` without sending anything when the
    /// name is empty or an available quantity exceeds its total.
    pub async fn create(&self, params: &NewCluster) -> ConsoleResult<Cluster> {
        params.validate()?;
        let envelope: DataEnvelope<Cluster> = self
            .client
            .post(&self.service, &[API, RESOURCE, ""], params)
            .await?;
        debug!(cluster_id = envelope.data.id, message = ?envelope.message, "cluster created");
        Ok(envelope.data)
    }

    /// Sends a partial update; fields absent from `patch` are left untouched.
    pub async fn update(&self, id: u64, patch: &ClusterPatch) -> ConsoleResult<Cluster> {
        patch.validate()?;
        let id = id.to_string();
        let envelope: DataEnvelope<Cluster> = self
            .client
            .patch(&self.service, &[API, RESOURCE, &id], patch)
            .await?;
        Ok(envelope.data)
    }

    pub async fn delete(&self, id: u64) -> ConsoleResult<()> {
        let path_id = id.to_string();
        let _: IgnoredAny = self
            .client
            .delete(&self.service, &[API, RESOURCE, &path_id])
            .await?;
        debug!(cluster_id = id, "cluster deleted");
        Ok(())
    }

    /// Asks the scheduler for a cluster able to host `request`.
    ///
    /// # Errors
    /// Fails with the server's `ConsoleError::Http` when no cluster fits.
    pub async fn find_suitable_host(
        &self,
        request: &SuitableHostRequest,
    ) -> ConsoleResult<PlacementDecision> {
        request.validate()?;
        let envelope: DataEnvelope<PlacementDecision> = self
            .client
            .post(&self.service, &[API, RESOURCE, "find-suitable-host"], request)
            .await?;
        Ok(envelope.data)
    }
}
