//! HTTP client adapter shared by every resource API module.

use crate::core::{
    domain::{
        error::{ConsoleError, ConsoleResult, ValidationError},
        value_object::ServiceName,
    },
    infrastructure::{auth_provider::AuthProvider, config::ConsoleConfig},
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    Client, Method, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP client that resolves service paths against the gateway, attaches the
/// bearer token and normalizes every failure into a [`ConsoleError`].
///
/// Each call is a single attempt: there is no retry on any status.
pub struct ApiClient {
    http_client: Client,
    config: Arc<ConsoleConfig>,
    auth: Arc<dyn AuthProvider>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns `ConsoleError::Validation` for an invalid rate limit and
    /// `ConsoleError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: ConsoleConfig, auth: Arc<dyn AuthProvider>) -> ConsoleResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.accepts_invalid_certs())
            .build()
            .map_err(|e| ConsoleError::Configuration(e.to_string()))?;

        let rate_limiter = match config.rate_limit() {
            Some(rate_limit) => {
                rate_limit.validate()?;
                let per_second = NonZeroU32::new(rate_limit.requests_per_second)
                    .ok_or_else(|| ValidationError::field("requests_per_second", "must be > 0"))?;
                let burst = NonZeroU32::new(rate_limit.burst_size)
                    .ok_or_else(|| ValidationError::field("burst_size", "must be > 0"))?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            config: Arc::new(config),
            auth,
            rate_limiter,
        })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Performs a GET request.
    ///
    /// # Errors
    /// Returns `ConsoleError::Network`, `ConsoleError::Http` or
    /// `ConsoleError::Shape` depending on where the call failed.
    pub async fn get<T>(&self, service: &ServiceName, segments: &[&str]) -> ConsoleResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::GET, service, segments, None::<&()>)
            .await
    }

    /// Performs a POST request with a JSON body.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn post<B, T>(
        &self,
        service: &ServiceName,
        segments: &[&str],
        body: &B,
    ) -> ConsoleResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::POST, service, segments, Some(body))
            .await
    }

    /// Performs a PATCH request with a JSON body.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn patch<B, T>(
        &self,
        service: &ServiceName,
        segments: &[&str],
        body: &B,
    ) -> ConsoleResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(Method::PATCH, service, segments, Some(body))
            .await
    }

    /// Performs a DELETE request.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn delete<T>(&self, service: &ServiceName, segments: &[&str]) -> ConsoleResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::DELETE, service, segments, None::<&()>)
            .await
    }

    async fn execute_request<B, T>(
        &self,
        method: Method,
        service: &ServiceName,
        segments: &[&str],
        body: Option<&B>,
    ) -> ConsoleResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let mut path = Vec::with_capacity(segments.len() + 1);
        path.push(service.as_str());
        path.extend_from_slice(segments);
        let url = self.config.base_url().join_segments(&path);

        debug!(%method, %url, "sending request");

        let mut req_builder = self
            .http_client
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");

        if let Some(token) = self.auth.access_token().await {
            req_builder = req_builder.header(AUTHORIZATION, token.as_bearer_header());
        }

        if let Some(timeout) = self.config.request_timeout() {
            req_builder = req_builder.timeout(timeout);
        }

        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(|e| {
                ValidationError::Format(format!("Request body could not be serialized: {}", e))
            })?;
            req_builder = req_builder
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| ConsoleError::Network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            ConsoleError::Network(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            let error = http_error(status, &bytes);
            warn!(%method, %url, status = status.as_u16(), error = %error, "request failed");
            return Err(error);
        }

        decode_body(status, &bytes)
    }
}

/// Builds the error for a non-2xx response.
fn http_error(status: StatusCode, body: &[u8]) -> ConsoleError {
    let payload = if body.is_empty() {
        None
    } else {
        Some(
            serde_json::from_slice::<serde_json::Value>(body).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(body).into_owned())
            }),
        )
    };

    let message = payload
        .as_ref()
        .and_then(server_message)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP status {}", status.as_u16()));

    ConsoleError::Http {
        status: status.as_u16(),
        message,
        payload,
    }
}

/// Extracts the human-readable reason a backend put in its error body.
fn server_message(payload: &serde_json::Value) -> Option<String> {
    match payload {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        serde_json::Value::Object(map) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|value| value.as_str()))
            .map(str::to_string),
        _ => None,
    }
}

/// Decodes a 2xx body into the expected type. An empty body reads as `null`.
fn decode_body<T>(status: StatusCode, body: &[u8]) -> ConsoleResult<T>
where
    T: DeserializeOwned,
{
    let decoded = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(body)
    };

    decoded.map_err(|e| ConsoleError::Shape {
        status: status.as_u16(),
        message: format!("Failed to parse response: {}", e),
    })
}
