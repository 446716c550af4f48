//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod addon;
pub mod logging;
pub mod media;

use serde::{Deserialize, Serialize};

use self::addon::AddonConfig;
use self::logging::LoggingConfig;
use self::media::MediaConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Addon runtime and installer settings.
    #[serde(default)]
    pub addons: AddonConfig,
    /// Media library settings used by the asset usage indexer.
    #[serde(default)]
    pub media: MediaConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; values are overlaid with environment variables
    /// prefixed with `PAGEHUB__` (e.g. `PAGEHUB__DATABASE__URL`). List
    /// settings take comma-separated values
    /// (`PAGEHUB__ADDONS__BUILTIN_ENABLED=com.a,com.b`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: &str, env: config::Environment) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(env)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

/// Environment keys that hold lists.
const LIST_KEYS: [&str; 2] = ["addons.builtin_enabled", "media.variant_sizes"];

fn environment() -> config::Environment {
    LIST_KEYS.into_iter().fold(
        config::Environment::with_prefix("PAGEHUB")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

fn default_database_url() -> String {
    "postgres://localhost:5432/pagehub".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
