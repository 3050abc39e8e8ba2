//! Token error taxonomy shared by the codec, the ledger and the services.

use thiserror::Error;

/// Failure kinds of verification, rotation and authentication.
///
/// Each variant is a distinct, matchable outcome; callers at the HTTP edge
/// may collapse several of them into one response, but the core never does.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// No bearer credential was presented
    #[error("Missing bearer token")]
    NoToken,

    /// Bad signature, malformed token, wrong token class, expired or missing claims
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The ledger has no row for this `(jti, user)` pair
    #[error("Refresh token not found")]
    NotFound,

    /// The ledger row was already revoked or rotated
    #[error("Refresh token has been revoked")]
    Revoked,

    /// The presented token does not match the stored hash
    #[error("Refresh token hash mismatch")]
    HashMismatch,

    /// The token's owner no longer exists
    #[error("User not found")]
    UserNotFound,
}

impl TokenError {
    /// Stable machine-readable code for logs and error bodies
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::NoToken => "NO_TOKEN",
            TokenError::InvalidToken => "INVALID_TOKEN",
            TokenError::NotFound => "TOKEN_NOT_FOUND",
            TokenError::Revoked => "TOKEN_REVOKED",
            TokenError::HashMismatch => "TOKEN_HASH_MISMATCH",
            TokenError::UserNotFound => "USER_NOT_FOUND",
        }
    }

    /// Whether this outcome indicates a refresh token was presented twice
    pub fn is_replay(&self) -> bool {
        matches!(self, TokenError::Revoked | TokenError::HashMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            TokenError::NoToken,
            TokenError::InvalidToken,
            TokenError::NotFound,
            TokenError::Revoked,
            TokenError::HashMismatch,
            TokenError::UserNotFound,
        ];
        let mut codes: Vec<_> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_replay_classification() {
        assert!(TokenError::Revoked.is_replay());
        assert!(TokenError::HashMismatch.is_replay());
        assert!(!TokenError::NotFound.is_replay());
        assert!(!TokenError::InvalidToken.is_replay());
    }
}
