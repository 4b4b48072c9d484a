//! Graph mailbox and calendar client.
//!
//! A [`GraphMailClient`] is built once by [`GraphMailClient::authenticate`]
//! and ends up in one of two states. An authenticated client issues requests
//! through its session; an unauthenticated client rejects every operation
//! with [`Error::NotAuthenticated`] before touching the network.

mod calendar;
mod folders;
mod mail;
pub(crate) mod wire;

use std::borrow::Cow;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

pub use calendar::default_window;
pub use folders::well_known_folder;
pub use mail::MAX_PAGE_SIZE;
pub use wire::MAX_INLINE_ATTACHMENT_BYTES;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::query::GraphRequest;
use crate::session::{ClientCredentialsSource, Session, SessionState, TokenSource};
use crate::transport::{GraphResponse, GraphTransport, ReqwestTransport};

struct Inner {
    session: Session,
    transport: Arc<dyn GraphTransport>,
}

/// Client for one Graph mailbox and its default calendar.
///
/// Cloning is cheap; clones share the session and its token cache.
#[derive(Clone)]
pub struct GraphMailClient {
    config: Arc<ClientConfig>,
    inner: Option<Arc<Inner>>,
}

impl std::fmt::Debug for GraphMailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphMailClient")
            .field("mailbox", &self.config.mailbox)
            .field("state", &self.state())
            .finish()
    }
}

impl GraphMailClient {
    /// Authenticates with the client credentials flow over HTTPS.
    ///
    /// Never fails: any problem (missing settings, bad tenant, rejected
    /// credentials, network) is logged and yields an unauthenticated client.
    pub async fn authenticate(config: ClientConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("Not authenticating: {e}");
            return Self::unauthenticated(config);
        }

        let source = match ClientCredentialsSource::from_config(&config) {
            Ok(source) => source,
            Err(e) => {
                warn!("Invalid OAuth settings: {e}");
                return Self::unauthenticated(config);
            }
        };
        let transport =
            match ReqwestTransport::new(config.graph_base_url.clone(), config.request_timeout) {
                Ok(transport) => transport,
                Err(e) => {
                    warn!("Failed to build HTTP client: {e}");
                    return Self::unauthenticated(config);
                }
            };

        Self::authenticate_with(config, Arc::new(source), Arc::new(transport)).await
    }

    /// Authenticates using the given token source and transport.
    ///
    /// The first token is fetched eagerly; failure yields an unauthenticated
    /// client. Invalid configuration is rejected before the source is asked.
    pub async fn authenticate_with(
        config: ClientConfig,
        source: Arc<dyn TokenSource>,
        transport: Arc<dyn GraphTransport>,
    ) -> Self {
        if let Err(e) = config.validate() {
            warn!("Not authenticating: {e}");
            return Self::unauthenticated(config);
        }

        let session = Session::new(source);
        match session.access_token().await {
            Ok(_) => {}
            Err(Error::Auth(e)) if e.is_credential_error() => {
                warn!(
                    tenant_id = %config.tenant_id,
                    client_id = %config.client_id,
                    "Client credentials rejected: {e}"
                );
                return Self::unauthenticated(config);
            }
            Err(e) => {
                warn!(tenant_id = %config.tenant_id, "Authentication failed: {e}");
                return Self::unauthenticated(config);
            }
        }

        info!(mailbox = %config.mailbox, "Authenticated");
        Self {
            config: Arc::new(config),
            inner: Some(Arc::new(Inner { session, transport })),
        }
    }

    /// Creates a client that rejects every operation.
    #[must_use]
    pub fn unauthenticated(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
            inner: None,
        }
    }

    /// Returns the session state fixed at construction.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.inner.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Returns true if the client holds a session.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns the configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn inner(&self) -> Result<&Inner> {
        self.inner.as_deref().ok_or(Error::NotAuthenticated)
    }

    /// Sends one request, re-authenticating once if the token is rejected.
    ///
    /// `resource` names the addressed object in `NotFound` errors.
    async fn execute(&self, request: &GraphRequest, resource: &str) -> Result<GraphResponse> {
        let inner = self.inner()?;

        let bearer = inner.session.access_token().await?;
        let mut response = inner.transport.send(request, &bearer).await?;

        if response.status == 401 {
            warn!(path = %request.path, "Access token rejected, re-authenticating");
            inner.session.invalidate(&bearer).await;
            let bearer = inner.session.access_token().await?;
            response = inner.transport.send(request, &bearer).await?;
        }

        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            "Graph response"
        );

        if response.is_success() {
            Ok(response)
        } else {
            Err(response.into_error(resource))
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: &GraphRequest,
        resource: &str,
    ) -> Result<T> {
        self.execute(request, resource).await?.json()
    }

    /// Path under the configured mailbox, e.g. `/users/a%40b.com/messages`.
    fn user_path(&self, suffix: &str) -> String {
        format!("/users/{}{suffix}", segment(&self.config.mailbox))
    }
}

/// Percent-encodes one path segment.
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
