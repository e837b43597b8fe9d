use crate::cli::{commands::Commands, handlers};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::TerminalExpiryNotice;
use autoeden_sdk::{ClientBuilder, Store};
use clap::Parser;
use clap_verbosity_flag::{OffLevel, Verbosity};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Auto Eden CLI - buy, sell and import cars from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "autoeden",
    author = "Auto Eden Team",
    version,
    about = "Auto Eden CLI - buy, sell and import cars from the terminal",
    long_about = "Command-line client for the Auto Eden car marketplace.

QUICK START:
  autoeden login                         # Sign in with email and password
  autoeden vehicles market --make Toyota # Browse verified listings
  autoeden bid place 42 8500             # Bid on a vehicle
  autoeden notifications list            # See what happened

IMPORT QUOTES:
  autoeden quote request 42 --name ... --email ...
  autoeden quote download 7              # Save the quote PDF

CONFIGURATION:
  autoeden config show                   # Show configuration
  autoeden config set api-url <url>      # Point at another backend"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<OffLevel>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let config = CliConfig::load(self.config.as_deref())?;
        let json = self.json;

        match self.command {
            Commands::Config { action } => {
                let config_path = match self.config {
                    Some(path) => path,
                    None => CliConfig::default_path()?,
                };
                handlers::config::handle_config(action, config, config_path, json).await
            }
            command => {
                let store = build_store(&config)?;
                store.hydrate().await?;
                dispatch(&store, command, json).await
            }
        }
    }
}

async fn dispatch(store: &Store, command: Commands, json: bool) -> Result<()> {
    match command {
        // Account
        Commands::Login { email } => handlers::auth::handle_login(store, email).await,
        Commands::Register { email, username } => {
            handlers::auth::handle_register(store, email, username).await
        }
        Commands::Logout => handlers::auth::handle_logout(store).await,
        Commands::Whoami => handlers::auth::handle_whoami(store, json).await,

        // Marketplace
        Commands::Vehicles { action } => {
            handlers::vehicles::handle_vehicles(store, action, json).await
        }
        Commands::Admin { action } => {
            handlers::vehicles::handle_admin(store, action, json).await
        }
        Commands::Bid { action } => handlers::bids::handle_bid(store, action, json).await,
        Commands::Notifications { action } => {
            handlers::notifications::handle_notifications(store, action, json).await
        }
        Commands::Ai { action } => handlers::ai::handle_ai(store, action, json).await,
        Commands::Quote { action } => handlers::quotes::handle_quote(store, action, json).await,
        Commands::Searches { action } => {
            handlers::searches::handle_searches(store, action, json).await
        }
        Commands::Stats => handlers::stats::handle_stats(store, json).await,

        Commands::Config { .. } => Err(CliError::internal(
            "configuration commands do not need an API client",
        )),
    }
}

/// Build a store whose auth state survives between invocations
pub fn build_store(config: &CliConfig) -> Result<Store> {
    let mut builder = ClientBuilder::from_config(&config.client_config());
    if config.session.auth_file.is_none() {
        builder = builder.file_auth();
    }
    let client = builder.build()?;
    debug!("Using API at {}", client.base_url());

    client.on_session_expired(Arc::new(TerminalExpiryNotice));
    Ok(Store::new(Arc::new(client)))
}
