//! Client Credentials Flow implementation (RFC 6749 section 4.4).

use super::OAuthClient;
use crate::error::{Error, Result};
use crate::token::Token;
use std::collections::HashMap;
use tracing::debug;

/// Client Credentials Flow for `OAuth2`.
///
/// Used by daemons and services that act as themselves rather than on
/// behalf of a signed-in user. The application's permissions are granted
/// by a tenant administrator; no browser or user code is involved.
#[derive(Debug, Clone)]
pub struct ClientCredentialsFlow {
    client: OAuthClient,
}

impl ClientCredentialsFlow {
    /// Creates a new client credentials flow.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client }
    }

    /// Returns the underlying OAuth client.
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// Requests an application access token.
    ///
    /// # Arguments
    ///
    /// * `scopes` - Optional scopes to request (uses provider defaults if None)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the provider, client id or secret is
    /// unusable, and an OAuth or HTTP error if the token request fails.
    pub async fn request_token(&self, scopes: Option<&[String]>) -> Result<Token> {
        self.client.provider.validate()?;
        if self.client.client_id.trim().is_empty() {
            return Err(Error::InvalidConfig("client_id is empty".into()));
        }
        let secret = self
            .client
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidConfig("client_secret is required".into()))?;

        let scope_str = scopes.map_or_else(
            || self.client.provider.default_scopes.join(" "),
            |s| s.join(" "),
        );

        let mut params = HashMap::new();
        params.insert("grant_type", "client_credentials");
        params.insert("client_id", self.client.client_id.as_str());
        params.insert("client_secret", secret);
        if !scope_str.is_empty() {
            params.insert("scope", &scope_str);
        }

        debug!(
            provider = %self.client.provider.name,
            scope = %scope_str,
            "Requesting client credentials token"
        );

        self.client.request_token(&params).await
    }
}
