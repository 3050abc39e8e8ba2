//! Configuration for the token service

use std::fmt;
use std::str::FromStr;

use hl_shared::config::{ConfigError, JwtConfig};
use jsonwebtoken::Algorithm;

/// Response to a refresh token being presented after it was consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayPolicy {
    /// Log the replay and fail the request
    #[default]
    Report,
    /// Additionally revoke every session of the token's owner
    RevokeAllSessions,
}

impl ReplayPolicy {
    /// Read `JWT_REPLAY_POLICY` (`report` or `revoke_all`), defaulting to `report`
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("JWT_REPLAY_POLICY") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Ok(Self::default()),
        }
    }
}

impl FromStr for ReplayPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "report" => Ok(ReplayPolicy::Report),
            "revoke_all" | "revoke-all" => Ok(ReplayPolicy::RevokeAllSessions),
            _ => Err(ConfigError::InvalidValue {
                name: "JWT_REPLAY_POLICY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for the token service
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// Access token signing secret
    pub access_secret: String,
    /// Refresh token signing secret
    pub refresh_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_ttl_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_seconds: i64,
    /// What to do when a consumed refresh token comes back
    pub replay_policy: ReplayPolicy,
}

impl TokenServiceConfig {
    /// Build from a loaded `JwtConfig`, re-checking its invariants
    pub fn from_jwt_config(jwt: &JwtConfig) -> Result<Self, ConfigError> {
        jwt.validate()?;

        Ok(Self {
            access_secret: jwt.access_secret.clone(),
            refresh_secret: jwt.refresh_secret.clone(),
            algorithm: Algorithm::HS256,
            access_ttl_seconds: jwt.access_token_ttl,
            refresh_ttl_seconds: jwt.refresh_token_ttl,
            replay_policy: ReplayPolicy::default(),
        })
    }

    /// Set the replay policy
    pub fn with_replay_policy(mut self, policy: ReplayPolicy) -> Self {
        self.replay_policy = policy;
        self
    }
}

impl fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("access_secret", &"**redacted**")
            .field("refresh_secret", &"**redacted**")
            .field("algorithm", &self.algorithm)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("replay_policy", &self.replay_policy)
            .finish()
    }
}
