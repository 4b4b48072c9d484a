//! # graphmail-core
//!
//! Microsoft Graph mailbox and calendar client core for `GraphMail`.
//!
//! This crate provides:
//! - Client credentials authentication with a shared, self-refreshing token
//! - Paged message listing, search, send, draft, move, delete and reply
//! - Attachment download into a local directory
//! - Default-calendar listing, creation and removal
//! - An explicit `OData` request builder and a pluggable HTTP transport
//! - A static registry exposing every operation under a stable name
//!
//! ## Example
//!
//! ```ignore
//! use graphmail_core::{ClientConfig, CommandRegistry, GraphMailClient};
//!
//! let config = ClientConfig::load(None)?;
//! let client = GraphMailClient::authenticate(config).await;
//! let registry = CommandRegistry::new(&client);
//!
//! let emails = registry
//!     .invoke("Microsoft - Get Emails", serde_json::json!({ "max_emails": 5 }))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachments;
pub mod client;
pub mod commands;
pub mod config;
pub mod credentials;
mod error;
pub mod model;
pub mod query;
pub mod session;
pub mod transport;

pub use attachments::AttachmentStore;
pub use client::GraphMailClient;
pub use commands::{Command, CommandRegistry};
pub use config::ClientConfig;
pub use credentials::{CredentialError, CredentialResult};
pub use error::{Error, Result};
pub use model::{
    AttachmentFile, BodyType, CalendarEvent, DateRange, EmailMessage, Importance, NewEvent,
    OutgoingMessage,
};
pub use query::{GraphRequest, Method, Query, page_plan};
pub use session::{ClientCredentialsSource, Session, SessionState, TokenSource};
pub use transport::{GraphResponse, GraphTransport, ReqwestTransport};
