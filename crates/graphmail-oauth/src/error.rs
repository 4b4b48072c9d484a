//! Error types for `OAuth2` operations.

/// Result type alias for `OAuth2` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `OAuth2` error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `OAuth2` error from server.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code (e.g., `invalid_client`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// Invalid token response.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Creates an OAuth error from error code and description.
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Returns true if the server rejected the client's credentials.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::OAuth { error, .. }
                if error == "invalid_client" || error == "unauthorized_client"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_error_detection() {
        assert!(Error::oauth_error("invalid_client", "bad secret").is_credential_error());
        assert!(Error::oauth_error("unauthorized_client", "").is_credential_error());
        assert!(!Error::oauth_error("invalid_scope", "").is_credential_error());
        assert!(!Error::InvalidConfig("client_secret is required".into()).is_credential_error());
    }

    #[test]
    fn test_oauth_error_display() {
        let err = Error::oauth_error("invalid_request", "tenant not found");
        assert_eq!(
            err.to_string(),
            "OAuth2 error: invalid_request - tenant not found"
        );
    }
}
