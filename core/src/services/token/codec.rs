//! Signing and verification of access and refresh tokens

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::{AccessClaims, RefreshClaims};
use crate::errors::{DomainError, TokenError};

use super::clock::Clock;
use super::config::TokenServiceConfig;

#[derive(Deserialize)]
struct ExpiryOnly {
    exp: Option<i64>,
}

fn expiry_overflow() -> DomainError {
    DomainError::Internal {
        message: "Token expiry is out of range".to_string(),
    }
}

/// Signs and verifies both token classes.
///
/// Access and refresh tokens use separate keys, so a token of one class
/// never verifies as the other. Expiry is checked against the injected
/// clock with zero leeway.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    header: Header,
    validation: Validation,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(config: &TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        // `exp` must be present, but it is compared against our clock, not the system's
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            header: Header::new(config.algorithm),
            validation,
            access_ttl_seconds: config.access_ttl_seconds,
            refresh_ttl_seconds: config.refresh_ttl_seconds,
            clock,
        }
    }

    /// Current instant according to the codec's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    /// Sign an access token for `identity`
    pub fn sign_access(&self, identity: &Identity) -> Result<String, DomainError> {
        let claims = AccessClaims::new(identity, self.now(), self.access_ttl_seconds)
            .ok_or_else(expiry_overflow)?;
        self.encode_jwt(&claims, &self.access_encoding)
    }

    /// Sign a refresh token for `identity` keyed by `jti`
    pub fn sign_refresh(&self, identity: &Identity, jti: &str) -> Result<String, DomainError> {
        let claims = RefreshClaims::new(identity, jti, self.now(), self.refresh_ttl_seconds)
            .ok_or_else(expiry_overflow)?;
        self.encode_jwt(&claims, &self.refresh_encoding)
    }

    /// Verify an access token and return the identity it carries
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - Signature valid, not expired, claims well-formed
    /// * `Err(TokenError::InvalidToken)` - Anything else
    pub fn verify_access(&self, token: &str) -> Result<Identity, TokenError> {
        let claims: AccessClaims = self.decode_jwt(token, &self.access_decoding)?;
        self.check_expiry(claims.exp)?;

        if claims.id.is_empty() || claims.email.is_empty() {
            return Err(TokenError::InvalidToken);
        }
        Ok(claims.identity())
    }

    /// Verify a refresh token and return its identity and `jti`
    pub fn verify_refresh(&self, token: &str) -> Result<(Identity, String), TokenError> {
        let (identity, jti, exp) = self.verify_refresh_signature(token)?;
        self.check_expiry(exp)?;
        Ok((identity, jti))
    }

    /// Verify a refresh token's signature and shape, ignoring expiry.
    ///
    /// Only for revocation: an expired token may still end its own session.
    pub fn verify_refresh_signature(
        &self,
        token: &str,
    ) -> Result<(Identity, String, i64), TokenError> {
        let claims: RefreshClaims = self.decode_jwt(token, &self.refresh_decoding)?;

        if claims.id.is_empty() || claims.email.is_empty() || claims.jti.is_empty() {
            return Err(TokenError::InvalidToken);
        }
        let identity = claims.identity();
        Ok((identity, claims.jti, claims.exp))
    }

    /// Read the `exp` claim without checking the signature.
    ///
    /// Only meant for tokens this codec has just signed.
    pub fn decode_expiry(&self, token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(self.header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<ExpiryOnly>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
        data.claims
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    fn check_expiry(&self, exp: i64) -> Result<(), TokenError> {
        if self.now().timestamp() >= exp {
            return Err(TokenError::InvalidToken);
        }
        Ok(())
    }

    /// Encodes claims into a JWT
    fn encode_jwt<T: Serialize>(&self, claims: &T, key: &EncodingKey) -> Result<String, DomainError> {
        encode(&self.header, claims, key).map_err(|e| DomainError::Internal {
            message: format!("Failed to sign token: {}", e),
        })
    }

    fn decode_jwt<T: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> Result<T, TokenError> {
        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token verification failed");
                TokenError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token::clock::ManualClock;
    use chrono::Duration;
    use hl_shared::config::JwtConfig;

    const ACCESS: &str = "access-secret-access-secret-access-secret";
    const REFRESH: &str = "refresh-secret-refresh-secret-refresh-secret";

    fn codec_with_clock() -> (TokenCodec, Arc<ManualClock>) {
        let jwt = JwtConfig::new(ACCESS, REFRESH).unwrap();
        let config = TokenServiceConfig::from_jwt_config(&jwt).unwrap();
        let clock = Arc::new(ManualClock::starting_now());
        (TokenCodec::new(&config, clock.clone()), clock)
    }

    fn identity() -> Identity {
        Identity::new("u1", "a@b.com")
    }

    #[test]
    fn test_access_round_trip() {
        let (codec, _) = codec_with_clock();
        let token = codec.sign_access(&identity()).unwrap();

        assert_eq!(codec.verify_access(&token).unwrap(), identity());
    }

    #[test]
    fn test_refresh_round_trip() {
        let (codec, _) = codec_with_clock();
        let token = codec.sign_refresh(&identity(), "jti-1").unwrap();

        let (who, jti) = codec.verify_refresh(&token).unwrap();
        assert_eq!(who, identity());
        assert_eq!(jti, "jti-1");
    }

    #[test]
    fn test_access_expires_exactly_at_ttl() {
        let (codec, clock) = codec_with_clock();
        let token = codec.sign_access(&identity()).unwrap();

        clock.advance(Duration::seconds(codec.access_ttl_seconds() - 1));
        assert!(codec.verify_access(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(codec.verify_access(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_refresh_expiry_enforced() {
        let (codec, clock) = codec_with_clock();
        let token = codec.sign_refresh(&identity(), "jti-1").unwrap();

        clock.advance(Duration::seconds(codec.refresh_ttl_seconds()));
        assert_eq!(codec.verify_refresh(&token), Err(TokenError::InvalidToken));
        // Signature-only verification still accepts it
        assert!(codec.verify_refresh_signature(&token).is_ok());
    }

    #[test]
    fn test_token_classes_do_not_cross_verify() {
        let (codec, _) = codec_with_clock();
        let access = codec.sign_access(&identity()).unwrap();
        let refresh = codec.sign_refresh(&identity(), "jti-1").unwrap();

        assert_eq!(codec.verify_refresh(&access), Err(TokenError::InvalidToken));
        assert_eq!(codec.verify_access(&refresh), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let (codec, _) = codec_with_clock();
        let token = codec.sign_refresh(&identity(), "jti-1").unwrap();

        // Flip the first signature character, which carries six full bits
        let at = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[at] = if bytes[at] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(codec.verify_refresh(&tampered), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_garbage_rejected() {
        let (codec, _) = codec_with_clock();
        assert_eq!(codec.verify_access("not-a-jwt"), Err(TokenError::InvalidToken));
        assert_eq!(codec.verify_access(""), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_empty_claims_rejected() {
        let (codec, _) = codec_with_clock();
        let token = codec.sign_refresh(&identity(), "").unwrap();
        assert_eq!(codec.verify_refresh(&token), Err(TokenError::InvalidToken));

        let token = codec.sign_access(&Identity::new("", "a@b.com")).unwrap();
        assert_eq!(codec.verify_access(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_decode_expiry_matches_ttl() {
        let (codec, _) = codec_with_clock();
        let token = codec.sign_refresh(&identity(), "jti-1").unwrap();

        let expiry = codec.decode_expiry(&token).unwrap();
        assert_eq!(
            expiry.timestamp(),
            codec.now().timestamp() + codec.refresh_ttl_seconds()
        );
        assert!(codec.decode_expiry("garbage").is_none());
    }

    #[test]
    fn test_out_of_range_ttl_fails_to_sign() {
        let jwt = JwtConfig::new(ACCESS, REFRESH).unwrap();
        let mut config = TokenServiceConfig::from_jwt_config(&jwt).unwrap();
        config.access_ttl_seconds = i64::MAX;
        config.refresh_ttl_seconds = i64::MAX;
        let codec = TokenCodec::new(&config, Arc::new(ManualClock::starting_now()));

        assert!(matches!(codec.sign_access(&identity()), Err(DomainError::Internal { .. })));
        assert!(matches!(
            codec.sign_refresh(&identity(), "jti-1"),
            Err(DomainError::Internal { .. })
        ));
    }
}
