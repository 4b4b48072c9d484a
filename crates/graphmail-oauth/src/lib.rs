//! # graphmail-oauth
//!
//! `OAuth2` authentication for daemon-style access to Microsoft Graph.
//!
//! ## Features
//!
//! - **Client credentials flow**: application tokens for a tenant, no user
//!   interaction
//! - **Token management**: expiration checking with a safety buffer
//! - **Provider configurations**: tenant-scoped Microsoft identity platform,
//!   or any custom token endpoint
//!
//! ## Quick Start
//!
//! ```ignore
//! use graphmail_oauth::{ClientCredentialsFlow, OAuthClient, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Provider::microsoft_tenant("contoso.onmicrosoft.com")?;
//!     let client = OAuthClient::new("your_client_id", provider)
//!         .with_client_secret("your_secret");
//!
//!     let flow = ClientCredentialsFlow::new(client);
//!     let token = flow.request_token(None).await?;
//!
//!     println!("Access token expires at {:?}", token.expires_at);
//!     Ok(())
//! }
//! ```
//!
//! ### Token Refresh
//!
//! Client-credentials tokens carry no refresh token; an expired token is
//! replaced by requesting a new one:
//!
//! ```ignore
//! if token.is_expired() {
//!     token = flow.request_token(None).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod token;

pub use error::{Error, Result};
pub use flow::{ClientCredentialsFlow, OAuthClient};
pub use provider::Provider;
pub use token::Token;
