//! CLI command definitions and dispatch.

pub mod addon;
pub mod migrate;
pub mod usage;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use pagehub_core::config::AppConfig;
use pagehub_core::error::AppError;
use pagehub_database::DatabasePool;

/// PageHub administration tool
#[derive(Debug, Parser)]
#[command(name = "pagehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Addon package management
    Addon(addon::AddonArgs),
    /// Asset usage index maintenance
    Usage(usage::UsageArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Addon(args) => addon::execute(args, &self.config, self.format).await,
            Commands::Usage(args) => usage::execute(args, &self.config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: open the database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}
