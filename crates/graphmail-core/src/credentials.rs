//! Secure client-secret storage using the system keyring.
//!
//! Provides secure storage for the app registration's client secret using
//! the platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "graphmail";

/// Credential type identifier for client secrets.
const CLIENT_SECRET_CREDENTIAL: &str = "client_secret";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Tenant and client id are required to address a secret.
    #[error("Tenant id and client id are required for credential storage")]
    MissingIdentity,
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Generates the keyring entry key for an app registration.
fn credential_key(tenant_id: &str, client_id: &str) -> CredentialResult<String> {
    let (tenant, client) = (tenant_id.trim(), client_id.trim());
    if tenant.is_empty() || client.is_empty() {
        return Err(CredentialError::MissingIdentity);
    }
    Ok(format!(
        "{SERVICE_NAME}_{CLIENT_SECRET_CREDENTIAL}_{tenant}_{client}"
    ))
}

/// Stores a client secret securely in the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_client_secret(tenant_id: &str, client_id: &str, secret: &str) -> CredentialResult<()> {
    let key = credential_key(tenant_id, client_id)?;
    let entry = Entry::new(SERVICE_NAME, &key)?;
    entry.set_password(secret)?;
    debug!(tenant_id, client_id, "Stored client secret");
    Ok(())
}

/// Retrieves a client secret from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_client_secret(tenant_id: &str, client_id: &str) -> CredentialResult<Option<String>> {
    let key = credential_key(tenant_id, client_id)?;
    let entry = Entry::new(SERVICE_NAME, &key)?;
    match entry.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => {
            debug!(tenant_id, client_id, "No client secret found");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes a client secret from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn delete_client_secret(tenant_id: &str, client_id: &str) -> CredentialResult<()> {
    let key = credential_key(tenant_id, client_id)?;
    let entry = Entry::new(SERVICE_NAME, &key)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => {
            warn!(tenant_id, client_id, "Failed to delete client secret: {e}");
            Err(e.into())
        }
    }
}
