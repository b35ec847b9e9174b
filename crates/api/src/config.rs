//! # API Configuration Module
//!
//! Settings of the clinic service, read once from the environment at start.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: bind address (default: "0.0.0.0")
//! - `API_PORT`: listen port (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
//! - `LOG_LEVEL`: "trace", "debug", "info", "warn" or "error" (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated origins allowed by CORS
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)

use eyre::{Result, WrapErr};
use std::{env, fmt::Display, str::FromStr};
use tracing::Level;
pub use vetclinic_core::config::parse_log_level;

/// Configuration for the clinic API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use vetclinic_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    /// `None` leaves CORS off entirely.
    pub cors_origins: Option<Vec<String>>,
    /// Seconds before a request is answered with 408.
    pub request_timeout: u64,
}

/// Reads `key` and parses it, using `default` when the variable is unset.
fn parsed_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| eyre::eyre!("Invalid {} value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl ApiConfig {
    /// Loads the configuration from environment variables.
    ///
    /// Fails when `DATABASE_URL` is missing or a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;

        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|raw| split_origins(&raw));

        Ok(Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed_var("API_PORT", 3000)?,
            database_url,
            database_max_connections: parsed_var("DATABASE_MAX_CONNECTIONS", 5)?,
            log_level: parse_log_level(&env::var("LOG_LEVEL").unwrap_or_default()),
            cors_origins,
            request_timeout: parsed_var("API_REQUEST_TIMEOUT_SECONDS", 30)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
