//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - PostgreSQL connection string
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `ACTIVE_POLL_INTERVAL_MS` - How often active-order subscribers check
//!   for changes (default: 2000)
//! - `RECENT_WINDOW_DAYS` - Default window for delivered/cancelled lists
//!   (default: 30)
//! - `PAGE_SIZE` - Default page size for delivered/cancelled lists
//!   (default: 20)

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::application::order_board::{DEFAULT_PAGE_SIZE, DEFAULT_WINDOW_DAYS};
use crate::handlers::orders::ListingDefaults;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub active_poll_interval: Duration,
    pub listing: ListingDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let poll_ms = parse_or(&lookup, "ACTIVE_POLL_INTERVAL_MS", 2000u64)?;
        if poll_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ACTIVE_POLL_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let window_days = parse_or(&lookup, "RECENT_WINDOW_DAYS", DEFAULT_WINDOW_DAYS)?;
        let page_size = parse_or(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?;

        Ok(Self {
            database_url,
            host,
            port,
            active_poll_interval: Duration::from_millis(poll_ms),
            listing: ListingDefaults {
                window_days: window_days.clamp(1, 365),
                page_size: page_size.clamp(1, 100),
            },
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}
