//! Token entities for JWT-based authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Token type reported to clients alongside every pair
pub const TOKEN_TYPE: &str = "Bearer";

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub id: String,

    /// User email
    pub email: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// User ID
    pub id: String,

    /// User email
    pub email: String,

    /// JWT ID, the key of the token's ledger row
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl AccessClaims {
    /// Creates claims for `identity` valid for `ttl_seconds` from `now`
    ///
    /// `None` when the expiry does not fit in a timestamp.
    pub fn new(identity: &Identity, now: DateTime<Utc>, ttl_seconds: i64) -> Option<Self> {
        Some(Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: now.timestamp().checked_add(ttl_seconds)?,
        })
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.email.clone())
    }
}

impl RefreshClaims {
    /// Creates claims for `identity` and ledger key `jti`
    pub fn new(
        identity: &Identity,
        jti: &str,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Option<Self> {
        Some(Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            jti: jti.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp().checked_add(ttl_seconds)?,
        })
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.email.clone())
    }
}

/// Lifecycle state of a ledger row at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    /// Usable for exactly one rotation
    Live,
    /// Consumed by a rotation; `replaced_by` names the successor
    Rotated,
    /// Revoked without a successor (logout)
    Revoked,
    /// Past `expires_at`
    Expired,
}

/// Persistent record of one issued refresh token.
///
/// Rows are never deleted by the core; they only move from unrevoked to
/// revoked, at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshLedgerEntry {
    /// Surrogate key
    pub id: i64,

    /// Owner of the token
    pub user_id: String,

    /// Matches the `jti` claim of the token; unique across the ledger
    pub jti: String,

    /// SHA-256 hex digest of the full token string
    pub token_hash: Option<String>,

    pub user_agent: Option<String>,

    pub ip_addr: Option<String>,

    /// Equals the token's `exp` claim
    pub expires_at: DateTime<Utc>,

    pub is_revoked: bool,

    /// `jti` of the token that replaced this one on rotation
    pub replaced_by: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl RefreshLedgerEntry {
    /// Checks if the row has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Derive the lifecycle state at `now`
    ///
    /// Revocation wins over expiry: a rotated row stays `Rotated` forever.
    pub fn status_at(&self, now: DateTime<Utc>) -> TokenStatus {
        if self.is_revoked {
            if self.replaced_by.is_some() {
                TokenStatus::Rotated
            } else {
                TokenStatus::Revoked
            }
        } else if self.is_expired_at(now) {
            TokenStatus::Expired
        } else {
            TokenStatus::Live
        }
    }
}

/// Insert payload for a new ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub user_id: String,
    pub jti: String,
    pub token_hash: Option<String>,
    pub user_agent: Option<String>,
    pub ip_addr: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl NewLedgerEntry {
    /// Materialize the row as stored, with the given surrogate key
    pub fn into_entry(self, id: i64, created_at: DateTime<Utc>) -> RefreshLedgerEntry {
        RefreshLedgerEntry {
            id,
            user_id: self.user_id,
            jti: self.jti,
            token_hash: self.token_hash,
            user_agent: self.user_agent,
            ip_addr: self.ip_addr,
            expires_at: self.expires_at,
            is_revoked: false,
            replaced_by: None,
            created_at,
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Always `Bearer`
    pub token_type: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    ///
    /// # Arguments
    ///
    /// * `access_token` - The JWT access token
    /// * `refresh_token` - The JWT refresh token
    /// * `access_expires_in` - Access token lifetime in seconds
    /// * `refresh_expires_in` - Refresh token lifetime in seconds
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            access_expires_in,
            refresh_expires_in,
        }
    }
}
