//! `GraphMail` command-line entry point.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;

use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;
use graphmail_core::{ClientConfig, CommandRegistry, GraphMailClient, credentials};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Action, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphmail=info,graphmail_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Action::StoreSecret {
            tenant_id,
            client_id,
        } => {
            let mut secret = String::new();
            io::stdin()
                .lock()
                .read_line(&mut secret)
                .context("Failed to read secret from stdin")?;
            let secret = secret.trim();
            if secret.is_empty() {
                bail!("No secret given on stdin");
            }
            credentials::store_client_secret(&tenant_id, &client_id, secret)?;
            info!(%tenant_id, %client_id, "Stored client secret");
        }
        Action::ClearSecret {
            tenant_id,
            client_id,
        } => {
            credentials::delete_client_secret(&tenant_id, &client_id)?;
            info!(%tenant_id, %client_id, "Removed client secret");
        }
        Action::List => {
            let registry = connect(cli.config.as_deref()).await?;
            if registry.is_empty() {
                warn!("Not authenticated; no commands available");
            }
            for name in registry.names() {
                println!("{name}");
            }
        }
        Action::Run { name, args } => {
            let args: serde_json::Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;
            let registry = connect(cli.config.as_deref()).await?;
            let result = registry.invoke(&name, args).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Loads configuration, fills a missing secret from the keyring, and
/// authenticates.
async fn connect(config_path: Option<&Path>) -> anyhow::Result<CommandRegistry> {
    let mut config = ClientConfig::load(config_path).context("Failed to load configuration")?;

    if needs_stored_secret(&config) {
        match credentials::get_client_secret(&config.tenant_id, &config.client_id) {
            Ok(Some(secret)) => config.client_secret = secret,
            Ok(None) => {}
            Err(e) => warn!("Could not read client secret from keyring: {e}"),
        }
    }

    let client = GraphMailClient::authenticate(config).await;
    Ok(CommandRegistry::new(&client))
}

/// True when the app registration is known but no usable secret was given.
fn needs_stored_secret(config: &ClientConfig) -> bool {
    config.client_secret.trim().is_empty()
        && !config.tenant_id.trim().is_empty()
        && !config.client_id.trim().is_empty()
}
