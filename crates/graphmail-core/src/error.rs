//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The client has no valid session; no request was attempted.
    #[error("Client is not authenticated")]
    NotAuthenticated,

    /// Token acquisition failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] graphmail_oauth::Error),

    /// Transport-level failure (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Graph returned a non-success status.
    #[error("Graph API error {status}: {code} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Graph error code (e.g., `ErrorInvalidIdMalformed`).
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The addressed message, event, or folder does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller supplied an invalid argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No command is registered under the given name.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] crate::credentials::CredentialError),
}

impl Error {
    /// Returns true if the failure means the access token was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
