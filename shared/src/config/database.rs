//! Database configuration module

use super::{env_parse, env_var, ConfigError};

/// Database configuration for MySQL connections
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout: u64,

    /// Maximum lifetime of a connection in seconds
    pub max_lifetime: u64,

    /// Create missing tables on startup
    pub ensure_schema: bool,
}

impl DatabaseConfig {
    /// Create from environment variables. `DATABASE_URL` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_var("DATABASE_URL")?,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10)?,
            connect_timeout: env_parse("DATABASE_CONNECT_TIMEOUT", 30)?,
            ensure_schema: env_parse("DATABASE_ENSURE_SCHEMA", true)?,
            ..Self::new(String::new())
        })
    }

    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            connect_timeout: 30,
            idle_timeout: 600,
            max_lifetime: 1800,
            ensure_schema: true,
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}
