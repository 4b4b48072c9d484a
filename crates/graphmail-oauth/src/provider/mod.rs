//! `OAuth2` provider configurations.

use crate::error::{Error, Result};
use url::Url;

/// Default scope for application access to Microsoft Graph.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Microsoft identity platform authority host.
const MICROSOFT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// `OAuth2` provider configuration.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Provider name (e.g., "Microsoft").
    pub name: String,
    /// Token endpoint URL.
    pub token_url: Url,
    /// Default scopes.
    pub default_scopes: Vec<String>,
}

impl Provider {
    /// Creates a new provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token URL is invalid.
    pub fn new(name: impl Into<String>, token_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            token_url: Url::parse(token_url.as_ref())?,
            default_scopes: Vec::new(),
        })
    }

    /// Sets the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Microsoft identity platform configuration for a single tenant.
    ///
    /// The tenant may be a directory GUID or a verified domain
    /// (`contoso.onmicrosoft.com`).
    ///
    /// Scopes:
    /// - `https://graph.microsoft.com/.default` - application permissions
    ///   granted to the app registration
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id is empty or malformed.
    pub fn microsoft_tenant(tenant_id: &str) -> Result<Self> {
        let tenant = tenant_id.trim();
        if tenant.is_empty() {
            return Err(Error::InvalidConfig("tenant_id is empty".into()));
        }
        if !tenant
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
        {
            return Err(Error::InvalidConfig(format!(
                "tenant_id contains invalid characters: {tenant}"
            )));
        }

        Ok(Self::new(
            "Microsoft",
            format!("{MICROSOFT_AUTHORITY}/{tenant}/oauth2/v2.0/token"),
        )?
        .with_default_scopes(vec![GRAPH_DEFAULT_SCOPE.to_string()]))
    }

    /// Validates that required URLs are set.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.token_url.as_str().is_empty() {
            return Err(Error::InvalidConfig("token_url is empty".into()));
        }
        if self.default_scopes.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "provider {} has no default scopes",
                self.name
            )));
        }
        Ok(())
    }
}
