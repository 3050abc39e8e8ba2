//! Bearer authentication of inbound requests

use std::sync::Arc;

use crate::domain::entities::identity::Identity;
use crate::errors::TokenError;

use super::codec::TokenCodec;

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly a scheme and a token separated by whitespace,
/// with the scheme equal to `Bearer` ignoring case.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::NoToken)?;
    let mut parts = header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Err(TokenError::NoToken)
            } else {
                Ok(token)
            }
        }
        _ => Err(TokenError::NoToken),
    }
}

/// Verifies the bearer access token of a request. Stateless: never touches the ledger.
#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: Arc<TokenCodec>,
}

impl RequestAuthenticator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Authenticate a request from its `Authorization` header
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - The identity carried by a valid access token
    /// * `Err(TokenError::NoToken)` - Header absent or not a bearer credential
    /// * `Err(TokenError::InvalidToken)` - Token present but not valid
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, TokenError> {
        let token = extract_bearer_token(authorization)?;
        self.codec.verify_access(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token::clock::SystemClock;
    use crate::services::token::config::TokenServiceConfig;
    use hl_shared::config::JwtConfig;

    fn authenticator() -> (RequestAuthenticator, Arc<TokenCodec>) {
        let jwt = JwtConfig::new(
            "access-secret-access-secret-access-secret",
            "refresh-secret-refresh-secret-refresh-secret",
        )
        .unwrap();
        let config = TokenServiceConfig::from_jwt_config(&jwt).unwrap();
        let codec = Arc::new(TokenCodec::new(&config, Arc::new(SystemClock)));
        (RequestAuthenticator::new(codec.clone()), codec)
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer_token(Some("bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer_token(Some("BEARER   abc ")), Ok("abc"));
    }

    #[test]
    fn test_extract_bearer_token_rejects_malformed() {
        assert_eq!(extract_bearer_token(None), Err(TokenError::NoToken));
        assert_eq!(extract_bearer_token(Some("")), Err(TokenError::NoToken));
        assert_eq!(extract_bearer_token(Some("Bearer")), Err(TokenError::NoToken));
        assert_eq!(extract_bearer_token(Some("Bearer ")), Err(TokenError::NoToken));
        assert_eq!(extract_bearer_token(Some("Basic abc")), Err(TokenError::NoToken));
        assert_eq!(extract_bearer_token(Some("Bearer a b")), Err(TokenError::NoToken));
        assert_eq!(extract_bearer_token(Some("abc")), Err(TokenError::NoToken));
    }

    #[test]
    fn test_authenticate() {
        let (auth, codec) = authenticator();
        let identity = Identity::new("u1", "a@b.com");
        let token = codec.sign_access(&identity).unwrap();

        let header = format!("Bearer {}", token);
        assert_eq!(auth.authenticate(Some(&header)), Ok(identity));
        assert_eq!(auth.authenticate(None), Err(TokenError::NoToken));
        assert_eq!(
            auth.authenticate(Some("Bearer not.a.token")),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_authenticate_rejects_refresh_token() {
        let (auth, codec) = authenticator();
        let token = codec
            .sign_refresh(&Identity::new("u1", "a@b.com"), "jti-1")
            .unwrap();

        let header = format!("Bearer {}", token);
        assert_eq!(auth.authenticate(Some(&header)), Err(TokenError::InvalidToken));
    }
}
