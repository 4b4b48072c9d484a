//! Client configuration.
//!
//! Values come from an optional JSON file, then environment overrides, then
//! explicit builder calls.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::BodyType;

/// Default Graph API base URL.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default directory for saved attachments.
pub const DEFAULT_ATTACHMENTS_DIR: &str = "./WORKSPACE/email_attachments/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names.
pub mod env {
    /// Application (client) id.
    pub const CLIENT_ID: &str = "M365_CLIENT_ID";
    /// Client secret.
    pub const CLIENT_SECRET: &str = "M365_CLIENT_SECRET";
    /// Directory (tenant) id.
    pub const TENANT_ID: &str = "M365_TENANT_ID";
    /// Mailbox user id or UPN.
    pub const MAILBOX: &str = "M365_MAILBOX";
    /// Attachment output directory.
    pub const ATTACHMENTS_DIR: &str = "GRAPHMAIL_ATTACHMENTS_DIR";
}

/// Configuration for a [`GraphMailClient`](crate::GraphMailClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Directory (tenant) id or verified domain.
    pub tenant_id: String,
    /// User id or principal name whose mailbox and calendar are addressed.
    pub mailbox: String,
    /// Graph API base URL.
    pub graph_base_url: String,
    /// Token endpoint override (defaults to the tenant's endpoint).
    pub token_url: Option<String>,
    /// Directory where attachments are saved.
    pub attachments_dir: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Content type for message and event bodies the client writes.
    pub body_type: BodyType,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("mailbox", &self.mailbox)
            .field("graph_base_url", &self.graph_base_url)
            .field("token_url", &self.token_url)
            .field("attachments_dir", &self.attachments_dir)
            .field("request_timeout", &self.request_timeout)
            .field("body_type", &self.body_type)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            tenant_id: String::new(),
            mailbox: String::new(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            token_url: None,
            attachments_dir: PathBuf::from(DEFAULT_ATTACHMENTS_DIR),
            request_timeout: DEFAULT_TIMEOUT,
            body_type: BodyType::Html,
        }
    }
}

/// On-disk representation; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    client_id: Option<String>,
    client_secret: Option<String>,
    tenant_id: Option<String>,
    mailbox: Option<String>,
    graph_base_url: Option<String>,
    token_url: Option<String>,
    attachments_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    body_type: Option<BodyType>,
}

impl ClientConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default config file location (`<config dir>/graphmail/config.json`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("graphmail").join("config.json"))
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(Self::default().merge_file(file))
    }

    /// Loads configuration from `path` (or the default location if it
    /// exists), then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default) => Self::from_file(&default)?,
                None => Self::default(),
            },
        };
        Ok(base.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Applies overrides from an environment lookup; empty values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(env::CLIENT_ID) {
            self.client_id = v;
        }
        if let Some(v) = get(env::CLIENT_SECRET) {
            self.client_secret = v;
        }
        if let Some(v) = get(env::TENANT_ID) {
            self.tenant_id = v;
        }
        if let Some(v) = get(env::MAILBOX) {
            self.mailbox = v;
        }
        if let Some(v) = get(env::ATTACHMENTS_DIR) {
            self.attachments_dir = PathBuf::from(v);
        }
        self
    }

    fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(v) = file.client_id {
            self.client_id = v;
        }
        if let Some(v) = file.client_secret {
            self.client_secret = v;
        }
        if let Some(v) = file.tenant_id {
            self.tenant_id = v;
        }
        if let Some(v) = file.mailbox {
            self.mailbox = v;
        }
        if let Some(v) = file.graph_base_url {
            self.graph_base_url = v;
        }
        if file.token_url.is_some() {
            self.token_url = file.token_url;
        }
        if let Some(v) = file.attachments_dir {
            self.attachments_dir = v;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = file.body_type {
            self.body_type = v;
        }
        self
    }

    /// Returns true when client id, secret and tenant id are all set.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        [&self.client_id, &self.client_secret, &self.tenant_id]
            .iter()
            .all(|v| !v.trim().is_empty())
    }

    /// Checks the settings needed to address a mailbox.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first missing setting.
    pub fn validate(&self) -> Result<()> {
        if !self.has_credentials() {
            return Err(Error::Config(
                "client_id, client_secret and tenant_id are required".into(),
            ));
        }
        if self.mailbox.trim().is_empty() {
            return Err(Error::Config("mailbox is required".into()));
        }
        if let Err(e) = url::Url::parse(self.graph_base_url.trim()) {
            return Err(Error::Config(format!(
                "graph_base_url {:?} is not a valid URL: {e}",
                self.graph_base_url
            )));
        }
        Ok(())
    }
}

/// Builder for client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Sets the client credentials.
    #[must_use]
    pub fn credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        self.config.client_id = client_id.into();
        self.config.client_secret = client_secret.into();
        self.config.tenant_id = tenant_id.into();
        self
    }

    /// Sets the mailbox user.
    #[must_use]
    pub fn mailbox(mut self, mailbox: impl Into<String>) -> Self {
        self.config.mailbox = mailbox.into();
        self
    }

    /// Sets the Graph API base URL.
    #[must_use]
    pub fn graph_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.graph_base_url = url.into();
        self
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = Some(url.into());
        self
    }

    /// Sets the attachment directory.
    #[must_use]
    pub fn attachments_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.attachments_dir = dir.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Sets the body content type.
    #[must_use]
    pub const fn body_type(mut self, body_type: BodyType) -> Self {
        self.config.body_type = body_type;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
