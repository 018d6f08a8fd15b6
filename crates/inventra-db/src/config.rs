//! Runtime configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. The composing binary builds one [`AppConfig`] at startup and
//! derives the [`DbConfig`] for the pool from it.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::pool::DbConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Sequence store file; a sibling of `database_path` when unset.
    pub sequence_path: Option<PathBuf>,

    /// Maximum pool connections.
    pub max_connections: u32,

    /// Deadline applied to each order placement.
    pub order_timeout: Duration,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("./inventra.db"),
            sequence_path: None,
            max_connections: 8,
            order_timeout: Duration::from_secs(30),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `INVENTRA_DATABASE_PATH` (default `./inventra.db`)
    /// - `INVENTRA_SEQUENCE_PATH` (default `./inventra.seq.db`)
    /// - `INVENTRA_MAX_CONNECTIONS` (default 8)
    /// - `INVENTRA_ORDER_TIMEOUT_SECS` (default 30)
    /// - `INVENTRA_LOG` (default `info`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars())
    }

    /// Builds configuration from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let defaults = AppConfig::default();

        let database_path = vars
            .get("INVENTRA_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let sequence_path = vars.get("INVENTRA_SEQUENCE_PATH").map(PathBuf::from);

        let max_connections: u32 = parse_or(&vars, "INVENTRA_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "INVENTRA_MAX_CONNECTIONS".to_string(),
            ));
        }

        let order_timeout_secs: u64 = parse_or(
            &vars,
            "INVENTRA_ORDER_TIMEOUT_SECS",
            defaults.order_timeout.as_secs(),
        )?;

        let log_filter = vars
            .get("INVENTRA_LOG")
            .cloned()
            .unwrap_or(defaults.log_filter);

        Ok(AppConfig {
            database_path,
            sequence_path,
            max_connections,
            order_timeout: Duration::from_secs(order_timeout_secs),
            log_filter,
        })
    }

    /// Pool configuration for this application.
    pub fn db_config(&self) -> DbConfig {
        let config = DbConfig::new(&self.database_path).max_connections(self.max_connections);
        match &self.sequence_path {
            Some(path) => config.sequence_path(path),
            None => config,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
