//! Client configuration.

use crate::core::domain::{
    error::{ConsoleError, ConsoleResult, ValidationError},
    value_object::{BaseUrl, ServiceName, validate_base_url, validate_service_name},
};
use std::env;
use std::time::Duration;

/// Default gateway route of the cluster service.
pub const DEFAULT_CLUSTER_SERVICE: &str = "SERVICE-CLUSTER";
/// Default gateway route of the VM-host service.
pub const DEFAULT_VM_HOST_SERVICE: &str = "SERVICE-VM-HOST";

pub const ENV_BASE_URL: &str = "VMHOST_CONSOLE_BASE_URL";
pub const ENV_CLUSTER_SERVICE: &str = "VMHOST_CONSOLE_CLUSTER_SERVICE";
pub const ENV_VM_HOST_SERVICE: &str = "VMHOST_CONSOLE_VM_HOST_SERVICE";
pub const ENV_TIMEOUT_SECS: &str = "VMHOST_CONSOLE_TIMEOUT_SECS";

/// Client-side request rate limit (token bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.requests_per_second == 0 {
            return Err(ValidationError::field(
                "requests_per_second",
                "Rate limit must allow at least one request per second",
            ));
        }
        if self.burst_size == 0 {
            return Err(ValidationError::field(
                "burst_size",
                "Burst size must be at least one",
            ));
        }
        Ok(())
    }
}

/// Everything the HTTP adapter needs to reach the gateway.
///
/// Retries are never performed. `request_timeout` and `rate_limit` are
/// opt-in and disabled by default.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub(crate) base_url: BaseUrl,
    pub(crate) cluster_service: ServiceName,
    pub(crate) vm_host_service: ServiceName,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) rate_limit: Option<RateLimitConfig>,
    pub(crate) accept_invalid_certs: bool,
}

impl ConsoleConfig {
    /// Creates a configuration with default service routes.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            cluster_service: ServiceName::new_unchecked(DEFAULT_CLUSTER_SERVICE),
            vm_host_service: ServiceName::new_unchecked(DEFAULT_VM_HOST_SERVICE),
            request_timeout: None,
            rate_limit: None,
            accept_invalid_certs: false,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConsoleError::Configuration` when the base URL is missing or
    /// the timeout is not an integer, and `ConsoleError::Validation` when a
    /// value is present but malformed.
    pub fn from_env() -> ConsoleResult<Self> {
        let raw_url = env::var(ENV_BASE_URL)
            .map_err(|_| ConsoleError::Configuration(format!("{} is not set", ENV_BASE_URL)))?;
        let mut config = Self::new(BaseUrl::new_unchecked(validate_base_url(&raw_url)?));

        if let Ok(name) = env::var(ENV_CLUSTER_SERVICE) {
            validate_service_name(&name)?;
            config.cluster_service = ServiceName::new_unchecked(name);
        }
        if let Ok(name) = env::var(ENV_VM_HOST_SERVICE) {
            validate_service_name(&name)?;
            config.vm_host_service = ServiceName::new_unchecked(name);
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ConsoleError::Configuration(format!(
                    "{} must be a whole number of seconds (got '{}')",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn cluster_service(&self) -> &ServiceName {
        &self.cluster_service
    }

    pub fn vm_host_service(&self) -> &ServiceName {
        &self.vm_host_service
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn rate_limit(&self) -> Option<RateLimitConfig> {
        self.rate_limit
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}
