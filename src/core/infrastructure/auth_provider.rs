//! Seam to the external authentication collaborator.
//!
//! Token acquisition and storage live outside this crate; the HTTP adapter
//! only asks for the current token before each request.

use crate::core::domain::value_object::AccessToken;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Supplies the bearer token attached to outgoing requests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the token to send, or `None` for anonymous requests.
    async fn access_token(&self) -> Option<AccessToken>;
}

/// Sends every request without credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

#[async_trait]
impl AuthProvider for Anonymous {
    async fn access_token(&self) -> Option<AccessToken> {
        None
    }
}

/// Sends the same token with every request.
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    pub fn new(token: AccessToken) -> Self {
        Self(token)
    }
}

#[async_trait]
impl AuthProvider for StaticToken {
    async fn access_token(&self) -> Option<AccessToken> {
        Some(self.0.clone())
    }
}
