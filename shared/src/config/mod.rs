//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing secrets and lifetimes
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server binding

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use thiserror::Error;

// Re-export commonly used types
pub use auth::{parse_ttl, JwtConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Default bcrypt cost when `BCRYPT_SALT_ROUNDS` is unset
pub const DEFAULT_BCRYPT_ROUNDS: u32 = 12;

/// Errors raised while resolving configuration at startup.
///
/// Any of these is fatal: the process must not start serving requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid duration for {name}: {value}")]
    InvalidDuration { name: String, value: String },

    #[error("{name} must be at least {min} bytes long")]
    SecretTooShort { name: String, min: usize },

    #[error("Access and refresh token secrets must differ")]
    SecretsNotDistinct,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Read a required, non-empty environment variable
pub(crate) fn env_var(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name.to_string())),
    }
}

/// Read an optional environment variable and parse it, falling back to `default`
pub(crate) fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// bcrypt cost used when hashing account passwords
    pub bcrypt_rounds: u32,
}

impl AppConfig {
    /// Load the whole configuration from the environment, failing on the
    /// first missing or malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();

        Ok(Self {
            environment,
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            logging: LoggingConfig::from_env(environment),
            bcrypt_rounds: env_parse("BCRYPT_SALT_ROUNDS", DEFAULT_BCRYPT_ROUNDS)?,
        })
    }
}
