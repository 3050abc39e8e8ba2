use serde::{Deserialize, Serialize};
use validator::Validate;

use hl_core::domain::entities::identity::Account;
use hl_core::domain::entities::token::TokenPair;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Body of refresh and logout calls from clients that cannot hold cookies
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[serde(default, alias = "refreshToken")]
    #[validate(length(min = 10))]
    pub refresh_token: Option<String>,
}

/// Token pair reply, with the account on register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Account>,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

impl AuthResponse {
    pub fn new(tokens: TokenPair) -> Self {
        Self { ok: true, user: None, tokens }
    }

    pub fn with_user(tokens: TokenPair, user: Account) -> Self {
        Self { ok: true, user: Some(user), tokens }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub ok: bool,
    /// Number of sessions this call revoked
    pub revoked: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub ok: bool,
    pub user: Account,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_request_accepts_camel_case_alias() {
        let request: RefreshTokenRequest =
            serde_json::from_str(r#"{"refreshToken":"abcdefghijkl"}"#).unwrap();
        assert_eq!(request.refresh_token.as_deref(), Some("abcdefghijkl"));

        let request: RefreshTokenRequest = serde_json::from_str("{}").unwrap();
        assert!(request.refresh_token.is_none());
    }

    #[test]
    fn test_refresh_request_rejects_short_token() {
        let request = RefreshTokenRequest { refresh_token: Some("short".to_string()) };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            name: String::new(),
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_auth_response_flattens_token_pair() {
        let pair = TokenPair::new("a".to_string(), "r".to_string(), 900, 3600);
        let json = serde_json::to_value(AuthResponse::new(pair)).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["token_type"], "Bearer");
        assert!(json.get("user").is_none());
    }
}
