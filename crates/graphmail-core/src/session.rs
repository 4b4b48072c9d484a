//! Authenticated session: token acquisition and caching.

use std::sync::Arc;

use async_trait::async_trait;
use graphmail_oauth::{ClientCredentialsFlow, OAuthClient, Provider, Token};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::Result;

/// Whether the client holds a usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token could be obtained; every operation short-circuits.
    Unauthenticated,
    /// A token was obtained at construction.
    Authenticated,
}

/// Source of access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Obtains a fresh access token.
    async fn fetch_token(&self) -> Result<Token>;
}

/// Token source backed by the `OAuth2` client credentials flow.
#[derive(Debug, Clone)]
pub struct ClientCredentialsSource {
    flow: ClientCredentialsFlow,
}

impl ClientCredentialsSource {
    /// Builds the source from client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant id or token URL is invalid, or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let provider = match &config.token_url {
            Some(url) => Provider::new("Microsoft", url)?
                .with_default_scopes(vec![graphmail_oauth::provider::GRAPH_DEFAULT_SCOPE.into()]),
            None => Provider::microsoft_tenant(&config.tenant_id)?,
        };
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let client = OAuthClient::new(&config.client_id, provider)
            .with_client_secret(&config.client_secret)
            .with_http_client(http_client);
        Ok(Self {
            flow: ClientCredentialsFlow::new(client),
        })
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsSource {
    async fn fetch_token(&self) -> Result<Token> {
        Ok(self.flow.request_token(None).await?)
    }
}

/// Holds the current access token and refreshes it on expiry.
///
/// The token is written only under the session lock, so at most one
/// refresh is in flight; concurrent callers wait for it to finish.
pub struct Session {
    source: Arc<dyn TokenSource>,
    token: Mutex<Option<Token>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session with no token yet.
    #[must_use]
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            token: Mutex::new(None),
        }
    }

    /// Returns a valid access token, fetching a new one if the cached token
    /// is missing or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if a new token cannot be obtained.
    pub async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }

        debug!(had_token = guard.is_some(), "Refreshing access token");
        let token = self.source.fetch_token().await?;
        info!(expires_at = ?token.expires_at, "Obtained access token");
        let access = token.access_token.clone();
        *guard = Some(token);
        Ok(access)
    }

    /// Drops the cached token if it is still `rejected`, so the next call
    /// re-authenticates.
    ///
    /// A token already replaced by another caller's refresh is kept.
    pub async fn invalidate(&self, rejected: &str) {
        let mut guard = self.token.lock().await;
        if guard.as_ref().is_some_and(|t| t.access_token == rejected) {
            *guard = None;
        } else {
            debug!("Rejected token already replaced, keeping current token");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        lifetime: Duration,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch_token(&self) -> Result<Token> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(Token::new(format!("token-{n}"), "Bearer")
                .with_expires_at(Utc::now() + self.lifetime))
        }
    }

    fn source(lifetime: Duration) -> Arc<CountingSource> {
        Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            lifetime,
        })
    }

    #[tokio::test]
    async fn test_token_is_cached_while_valid() {
        let src = source(Duration::hours(1));
        let session = Session::new(src.clone());

        assert_eq!(session.access_token().await.unwrap(), "token-0");
        assert_eq!(session.access_token().await.unwrap(), "token-0");
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        // Inside the 60 second expiry buffer, so every token is already stale.
        let src = source(Duration::seconds(10));
        let session = Session::new(src.clone());

        assert_eq!(session.access_token().await.unwrap(), "token-0");
        assert_eq!(session.access_token().await.unwrap(), "token-1");
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let src = source(Duration::hours(1));
        let session = Session::new(src.clone());

        let rejected = session.access_token().await.unwrap();
        session.invalidate(&rejected).await;
        assert_eq!(session.access_token().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn test_stale_rejection_keeps_refreshed_token() {
        let src = source(Duration::hours(1));
        let session = Session::new(src.clone());

        let first = session.access_token().await.unwrap();
        session.invalidate(&first).await;
        assert_eq!(session.access_token().await.unwrap(), "token-1");

        // A second caller reporting the same old token must not discard
        // the refresh the first caller already made.
        session.invalidate(&first).await;
        assert_eq!(session.access_token().await.unwrap(), "token-1");
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let src = source(Duration::hours(1));
        let session = Arc::new(Session::new(src.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                tokio::spawn(async move { session.access_token().await.unwrap() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "token-0");
        }
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    }
}
