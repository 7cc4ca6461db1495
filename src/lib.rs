mod cluster;
mod core;
pub mod store;
mod vm_host;

pub use crate::cluster::application::service::cluster_service::ClusterService;
pub use crate::core::domain::error::{
    ConsoleError, ConsoleResult, ErrorKind, NETWORK_ERROR_STATUS, NormalizedError,
    ValidationError,
};
pub use crate::core::domain::model::{
    cluster::{
        Capacity, CapacityDimension, CapacityFields, Cluster, ClusterPatch, NewCluster,
        PlacementDecision, SuitableHostRequest,
    },
    service_health::{HealthStatus, ServiceInfo},
    vm::{
        CreateVmParams, VirtualMachine, VmActionRequest, VmActionResult, VmMetrics, VmStatus,
        VmStatusReport,
    },
};
pub use crate::core::domain::value_object::{AccessToken, BaseUrl, Identifier, ServiceName};
pub use crate::core::infrastructure::{
    api_client::ApiClient,
    auth_provider::{Anonymous, AuthProvider, StaticToken},
    config::{
        ConsoleConfig, DEFAULT_CLUSTER_SERVICE, DEFAULT_VM_HOST_SERVICE, ENV_BASE_URL,
        ENV_CLUSTER_SERVICE, ENV_TIMEOUT_SECS, ENV_VM_HOST_SERVICE, RateLimitConfig,
    },
};
pub use crate::store::console_store::ConsoleStore;
pub use crate::vm_host::application::service::vm_host_service::VmHostService;

use crate::core::domain::value_object::{
    validate_access_token, validate_base_url, validate_service_name,
};
use std::sync::Arc;
use std::time::Duration;

/// A client for the VM hosting console backends.
///
/// The client owns one HTTP adapter shared by the cluster and VM-host
/// services and by every store created from it.
///
/// # Examples
///
/// ```no_run
/// use vmhost_console::{ConsoleClient, ConsoleResult, NewCluster};
///
/// #[tokio::main]
/// async fn main() -> ConsoleResult<()> {
///     let client = ConsoleClient::builder()
///         .base_url("https://gateway.example.com")?
///         .access_token("token-from-the-auth-service")?
///         .build()?;
///
///     let store = client.init_store();
///     store.clusters().fetch_clusters().await?;
///     store
///         .clusters()
///         .create_cluster(&NewCluster::new("edge-1").with_ram(64, 64))
///         .await?;
///
///     store.dispose();
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    api: Arc<ApiClient>,
}

/// Builder for ConsoleClient configuration
#[derive(Default)]
pub struct ConsoleClientBuilder {
    base_url: Option<BaseUrl>,
    cluster_service: Option<ServiceName>,
    vm_host_service: Option<ServiceName>,
    auth: Option<Arc<dyn AuthProvider>>,
    request_timeout: Option<Duration>,
    rate_limit: Option<RateLimitConfig>,
    accept_invalid_certs: bool,
}

impl std::fmt::Debug for ConsoleClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleClientBuilder")
            .field("base_url", &self.base_url)
            .field("cluster_service", &self.cluster_service)
            .field("vm_host_service", &self.vm_host_service)
            .field("has_auth", &self.auth.is_some())
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit", &self.rate_limit)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl ConsoleClientBuilder {
    pub fn base_url(mut self, url: impl AsRef<str>) -> ConsoleResult<Self> {
        let url = validate_base_url(url.as_ref())?;
        self.base_url = Some(BaseUrl::new_unchecked(url));
        Ok(self)
    }

    /// Overrides the gateway route of the cluster service.
    pub fn cluster_service(mut self, name: impl Into<String>) -> ConsoleResult<Self> {
        let name = name.into();
        validate_service_name(&name)?;
        self.cluster_service = Some(ServiceName::new_unchecked(name));
        Ok(self)
    }

    /// Overrides the gateway route of the VM-host service.
    pub fn vm_host_service(mut self, name: impl Into<String>) -> ConsoleResult<Self> {
        let name = name.into();
        validate_service_name(&name)?;
        self.vm_host_service = Some(ServiceName::new_unchecked(name));
        Ok(self)
    }

    /// Sends `token` as a bearer token with every request.
    pub fn access_token(mut self, token: impl Into<String>) -> ConsoleResult<Self> {
        let token = token.into();
        validate_access_token(&token)?;
        self.auth = Some(Arc::new(StaticToken::new(AccessToken::new_unchecked(token))));
        Ok(self)
    }

    /// Uses `provider` to obtain the token before each request.
    pub fn auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> ConsoleResult<Self> {
        let limit = RateLimitConfig {
            requests_per_second,
            burst_size,
        };
        limit.validate()?;
        self.rate_limit = Some(limit);
        Ok(self)
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> ConsoleResult<ConsoleClient> {
        let base_url = self.base_url.ok_or_else(|| {
            ConsoleError::from(ValidationError::Field {
                field: "base_url".to_string(),
                message: "Base URL is required".to_string(),
            })
        })?;

        let mut config = ConsoleConfig::new(base_url);
        if let Some(name) = self.cluster_service {
            config.cluster_service = name;
        }
        if let Some(name) = self.vm_host_service {
            config.vm_host_service = name;
        }
        config.request_timeout = self.request_timeout;
        config.rate_limit = self.rate_limit;
        config.accept_invalid_certs = self.accept_invalid_certs;

        let auth = self.auth.unwrap_or_else(|| Arc::new(Anonymous));
        ConsoleClient::from_config(config, auth)
    }
}

impl ConsoleClient {
    /// Creates a new builder for ConsoleClient configuration
    pub fn builder() -> ConsoleClientBuilder {
        ConsoleClientBuilder::default()
    }

    /// Creates a client from an already assembled configuration.
    pub fn from_config(config: ConsoleConfig, auth: Arc<dyn AuthProvider>) -> ConsoleResult<Self> {
        Ok(Self {
            api: Arc::new(ApiClient::new(config, auth)?),
        })
    }

    /// Creates an anonymous client configured from the environment.
    ///
    /// # Errors
    /// See [`ConsoleConfig::from_env`].
    pub fn from_env() -> ConsoleResult<Self> {
        Self::from_config(ConsoleConfig::from_env()?, Arc::new(Anonymous))
    }

    pub fn config(&self) -> &ConsoleConfig {
        self.api.config()
    }

    pub fn cluster_service(&self) -> ClusterService {
        ClusterService::new(Arc::clone(&self.api))
    }

    pub fn vm_host_service(&self) -> VmHostService {
        VmHostService::new(Arc::clone(&self.api))
    }

    /// Creates a fresh store with empty slices.
    pub fn init_store(&self) -> ConsoleStore {
        ConsoleStore::init(Arc::clone(&self.api))
    }
}

#[cfg(test)]
mod tests;
