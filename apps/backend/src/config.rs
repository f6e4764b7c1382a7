//! Environment configuration

use crate::error::{ApiError, Result};

/// Server configuration read from the environment (and `.env`).
///
/// - DATABASE_URL: PostgreSQL connection string (required)
/// - HOST: bind address, default `0.0.0.0`
/// - PORT: bind port, default `3000`
/// - DATABASE_MAX_CONNECTIONS: pool size, default `10`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::Config("DATABASE_URL must be set".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::Config(format!("invalid PORT: {}", raw)))?,
            None => 3000,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ApiError::Config(format!("invalid DATABASE_MAX_CONNECTIONS: {}", raw))
                })?,
            None => 10,
        };

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
