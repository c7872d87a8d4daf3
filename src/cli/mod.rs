//! Command line interface
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply (or revert) PostgreSQL migrations
//! - `check-config`: print the resolved configuration with secrets hidden

pub mod check;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// IPTV Gateway - accounts, provider profiles and a paginated catalog proxy
#[derive(Parser)]
#[command(name = "iptv-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending PostgreSQL migrations
    Migrate(migrate::MigrateArgs),

    /// Print the resolved configuration with secrets redacted
    CheckConfig,
}

/// Load `.env`, then the layered configuration
pub fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    AppConfig::load().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))
}
