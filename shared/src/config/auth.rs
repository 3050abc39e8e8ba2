//! Authentication configuration: token signing secrets and lifetimes

use std::fmt;

use super::{env_var, ConfigError};

/// Default access token lifetime
pub const DEFAULT_ACCESS_TTL: &str = "15m";

/// Default refresh token lifetime
pub const DEFAULT_REFRESH_TTL: &str = "30d";

/// Longest accepted token lifetime: ten years, in seconds
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Minimum accepted length of a signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// JWT configuration for the access/refresh token pair.
///
/// Access and refresh tokens are signed with distinct secrets so that a token
/// of one class can never verify as the other.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret used to sign and verify access tokens
    pub access_secret: String,

    /// Secret used to sign and verify refresh tokens
    pub refresh_secret: String,

    /// Access token lifetime in seconds
    pub access_token_ttl: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,
}

impl JwtConfig {
    /// Create a configuration with default lifetimes and validate it
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_token_ttl: parse_ttl("JWT_ACCESS_TTL", DEFAULT_ACCESS_TTL)?,
            refresh_token_ttl: parse_ttl("JWT_REFRESH_TTL", DEFAULT_REFRESH_TTL)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `JWT_ACCESS_SECRET`, `JWT_REFRESH_SECRET`, `JWT_ACCESS_TTL`
    /// and `JWT_REFRESH_TTL`.
    ///
    /// Both secrets are required; the lifetimes fall back to `15m` and `30d`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_secret = env_var("JWT_ACCESS_SECRET")?;
        let refresh_secret = env_var("JWT_REFRESH_SECRET")?;

        let access_ttl = std::env::var("JWT_ACCESS_TTL")
            .unwrap_or_else(|_| DEFAULT_ACCESS_TTL.to_string());
        let refresh_ttl = std::env::var("JWT_REFRESH_TTL")
            .unwrap_or_else(|_| DEFAULT_REFRESH_TTL.to_string());

        let config = Self {
            access_secret,
            refresh_secret,
            access_token_ttl: parse_ttl("JWT_ACCESS_TTL", &access_ttl)?,
            refresh_token_ttl: parse_ttl("JWT_REFRESH_TTL", &refresh_ttl)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the access token lifetime
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl = seconds;
        self
    }

    /// Override the refresh token lifetime
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl = seconds;
        self
    }

    /// Check the invariants a signing configuration must satisfy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::MissingVar("JWT_ACCESS_SECRET".to_string()));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::MissingVar("JWT_REFRESH_SECRET".to_string()));
        }
        if self.access_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                name: "JWT_ACCESS_SECRET".to_string(),
                min: MIN_SECRET_LENGTH,
            });
        }
        if self.refresh_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                name: "JWT_REFRESH_SECRET".to_string(),
                min: MIN_SECRET_LENGTH,
            });
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::SecretsNotDistinct);
        }
        if !ttl_in_range(self.access_token_ttl) {
            return Err(ConfigError::InvalidDuration {
                name: "JWT_ACCESS_TTL".to_string(),
                value: self.access_token_ttl.to_string(),
            });
        }
        if !ttl_in_range(self.refresh_token_ttl) {
            return Err(ConfigError::InvalidDuration {
                name: "JWT_REFRESH_TTL".to_string(),
                value: self.refresh_token_ttl.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"**redacted**")
            .field("refresh_secret", &"**redacted**")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

fn ttl_in_range(seconds: i64) -> bool {
    (1..=MAX_TTL_SECONDS).contains(&seconds)
}

/// Parse a lifetime such as `900`, `15m`, `12h`, `30d` or `2w` into seconds.
///
/// A bare number is read as seconds. Zero and anything above
/// `MAX_TTL_SECONDS` are rejected. `name` is only used for error reporting.
pub fn parse_ttl(name: &str, value: &str) -> Result<i64, ConfigError> {
    let invalid = || ConfigError::InvalidDuration {
        name: name.to_string(),
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let split_at = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split_at);

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    match amount.checked_mul(multiplier) {
        Some(seconds) if ttl_in_range(seconds) => Ok(seconds),
        _ => Err(invalid()),
    }
}
