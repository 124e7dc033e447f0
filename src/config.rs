//! Configuration loader for the `codemetal-airquality` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Route handlers receive the loaded [`Config`]
//! through the shared application state and never read the environment.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Shortest and longest look-back window accepted by the windowed endpoints.
pub const MIN_WINDOW_HOURS: u32 = 1;
pub const MAX_WINDOW_HOURS: u32 = 168;

/// Parse an optional numeric environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// TCP port the HTTP server binds on all interfaces.
    pub listen_port: u16,

    /// Window used by `/aggregations/zip-trends` when `hours_back` is omitted.
    pub zip_trends_default_hours: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `LISTEN_PORT` – HTTP port (default: 8080)
/// - `ZIP_TRENDS_DEFAULT_HOURS` – default trend window (default: 24, clamped to 1..=168)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env!("DB_POOL_MAX", u32, 5);
    let listen_port = parse_env!("LISTEN_PORT", u16, 8080);
    let zip_trends_default_hours = parse_env!("ZIP_TRENDS_DEFAULT_HOURS", u32, 24)
        .clamp(MIN_WINDOW_HOURS, MAX_WINDOW_HOURS);

    Ok(Config {
        db_url,
        db_pool_max,
        listen_port,
        zip_trends_default_hours,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL             : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX              : {}", self.db_pool_max);
        tracing::info!("  LISTEN_PORT              : {}", self.listen_port);
        tracing::info!("  ZIP_TRENDS_DEFAULT_HOURS : {}", self.zip_trends_default_hours);
    }

    /// Database URL with the password replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        let url = &self.db_url;
        let Some(creds_start) = url.find("://").map(|i| i + 3) else {
            return url.clone();
        };
        match url.rfind('@') {
            Some(at_pos) if at_pos > creds_start => match url[creds_start..at_pos].find(':') {
                Some(colon) => format!(
                    "{}:****{}",
                    &url[..creds_start + colon],
                    &url[at_pos..]
                ),
                None => url.clone(),
            },
            _ => url.clone(),
        }
    }
}
