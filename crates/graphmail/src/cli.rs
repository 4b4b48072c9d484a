//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to `<config dir>/graphmail/config.json`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Print the names of the available commands.
    List,

    /// Run a command by name and print its JSON result.
    Run {
        /// Command name, e.g. "Microsoft - Get Emails".
        name: String,

        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Read a client secret from stdin and store it in the system keyring.
    StoreSecret {
        /// Directory (tenant) id of the app registration.
        #[arg(long)]
        tenant_id: String,
        /// Application (client) id of the app registration.
        #[arg(long)]
        client_id: String,
    },

    /// Remove a stored client secret from the system keyring.
    ClearSecret {
        /// Directory (tenant) id of the app registration.
        #[arg(long)]
        tenant_id: String,
        /// Application (client) id of the app registration.
        #[arg(long)]
        client_id: String,
    },
}
