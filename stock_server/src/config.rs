//! Server configuration.
//!
//! Values come from three layers, highest priority first:
//! 1. command-line flags or their environment variables (`clap`),
//! 2. an optional TOML file passed with `--config`,
//! 3. the defaults in `stock_common::net`.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use stock_common::net::{self, DEFAULT_DATABASE_URL, DEFAULT_PORT, DEFAULT_REFRESH_SECS};
use stock_common::{Result, StockError};

use crate::store::StoreBackend;

/// Parsed command-line arguments.
#[derive(Debug, Default, Parser)]
#[command(version, about = "Stock tracker HTTP server", long_about = None)]
pub struct Args {
    /// Optional TOML file with `port`, `store`, `database_url` and `refresh_secs`.
    #[arg(long, env = "STOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// TCP port the HTTP API listens on.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Record store backend: `memory` or `postgres`.
    #[arg(long, env = "STOCK_STORE")]
    pub store: Option<StoreBackend>,

    /// PostgreSQL endpoint, e.g. `host=127.0.0.1 user=postgres`.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Seconds between two price refresh ticks.
    #[arg(long, env = "REFRESH_SECS")]
    pub refresh_secs: Option<u64>,
}

/// Shape of the TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(missing_docs)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub store: Option<String>,
    pub database_url: Option<String>,
    pub refresh_secs: Option<u64>,
}

impl FileConfig {
    /// Parse a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| StockError::Config(e.to_string()))
    }
}

/// Fully resolved settings the server runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP listening port.
    pub port: u16,
    /// Record store backend.
    pub store: StoreBackend,
    /// PostgreSQL endpoint; the database name in it is ignored.
    pub database_url: String,
    /// Time between two refresh ticks, never zero.
    pub refresh_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            store: StoreBackend::Postgres,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

impl ServerConfig {
    /// Resolve the configuration from `args`, reading the config file if one is named.
    pub fn load(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::from_toml(&fs::read_to_string(path)?)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Layer `args` over `file` over the defaults.
    pub fn merge(args: Args, file: FileConfig) -> Result<Self> {
        let defaults = ServerConfig::default();

        let store = match (args.store, file.store) {
            (Some(store), _) => store,
            (None, Some(name)) => name
                .parse()
                .map_err(|_| StockError::Config(format!("unknown store backend: {}", name)))?,
            (None, None) => defaults.store,
        };

        let refresh_secs = args
            .refresh_secs
            .or(file.refresh_secs)
            .unwrap_or(DEFAULT_REFRESH_SECS);
        if refresh_secs == 0 {
            return Err(StockError::Config(
                "refresh interval must be at least one second".to_string(),
            ));
        }

        Ok(ServerConfig {
            port: args.port.or(file.port).unwrap_or(defaults.port),
            store,
            database_url: args
                .database_url
                .or(file.database_url)
                .unwrap_or(defaults.database_url),
            refresh_interval: Duration::from_secs(refresh_secs),
        })
    }

    /// Address the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        net::addr("0.0.0.0", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_args_or_file() {
        let config = ServerConfig::merge(Args::default(), FileConfig::default()).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3001);
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
    }

    #[test]
    fn file_overrides_defaults_and_args_override_file() {
        let file = FileConfig::from_toml(
            r#"
            port = 8000
            store = "memory"
            refresh_secs = 2
            "#,
        )
        .unwrap();
        let args = Args {
            port: Some(9000),
            ..Default::default()
        };

        let config = ServerConfig::merge(args, file).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.refresh_interval, Duration::from_secs(2));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let args = Args {
            refresh_secs: Some(0),
            ..Default::default()
        };
        let err = ServerConfig::merge(args, FileConfig::default()).unwrap_err();
        assert!(matches!(err, StockError::Config(_)));
    }

    #[test]
    fn unknown_backend_and_keys_are_rejected() {
        let file = FileConfig::from_toml(r#"store = "mongo""#).unwrap();
        assert!(ServerConfig::merge(Args::default(), file).is_err());
        assert!(FileConfig::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn cli_flags_parse() {
        let args = Args::try_parse_from([
            "stock_server",
            "--port",
            "4000",
            "--store",
            "memory",
            "--refresh-secs",
            "1",
        ])
        .unwrap();
        assert_eq!(args.port, Some(4000));
        assert_eq!(args.store, Some(StoreBackend::Memory));
        assert_eq!(args.refresh_secs, Some(1));
    }
}
