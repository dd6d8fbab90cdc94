//! Environment-driven configuration.
//!
//! Database parameters are required and have no fallback values; the
//! service refuses to start without them.

use crate::infrastructure::db_pool::DbSettings;
use thiserror::Error;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub db: DbSettings,
    pub debug: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingVar(&'static str),
    #[error("environment variable {0} must be a valid port number")]
    InvalidPort(&'static str),
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let listen_addr =
        std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

    let db = DbSettings {
        host: require("DB_HOST")?,
        user: require("DB_USER")?,
        password: require("DB_PASSWORD")?,
        database: require("DB_DATABASE")?,
        port: require("DB_PORT")?
            .parse()
            .map_err(|_| ConfigError::InvalidPort("DB_PORT"))?,
    };

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        listen_addr,
        db,
        debug,
    })
}
