//! Mapping from domain and request errors to HTTP responses

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use hl_core::errors::{DomainError, TokenError};
use hl_infra::InfrastructureError;
use hl_shared::errors::{error_codes, ErrorResponse};

/// Errors a handler can return; each renders as an `ErrorResponse` body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("Request validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest { code, message: message.into() }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized { code, message: message.into() }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound { code, message: message.into() }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict { code, message: message.into() }
    }

    /// Error code and client-facing message for this error
    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            ApiError::BadRequest { code, message }
            | ApiError::Unauthorized { code, message }
            | ApiError::NotFound { code, message }
            | ApiError::Conflict { code, message } => (*code, message.clone()),
            ApiError::Validation(_) => (error_codes::VALIDATION_ERROR, self.to_string()),
            ApiError::Domain(DomainError::Token(token)) => token_code_and_message(*token),
            ApiError::Domain(_) | ApiError::Infrastructure(_) => {
                (error_codes::INTERNAL_ERROR, "An internal error occurred".to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Domain(err.into())
    }
}

fn token_code_and_message(err: TokenError) -> (&'static str, String) {
    match err {
        TokenError::NoToken => (error_codes::NO_TOKEN, "Missing bearer token".to_string()),
        TokenError::UserNotFound => (error_codes::USER_NOT_FOUND, "User not found".to_string()),
        _ => (error_codes::INVALID_TOKEN, "Invalid or expired token".to_string()),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Domain(DomainError::Token(TokenError::UserNotFound)) => StatusCode::NOT_FOUND,
            ApiError::Domain(DomainError::Token(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Domain(_) | ApiError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            // Details stay in the logs, never in the body
            tracing::error!(error = %self, "Request failed");
        }

        let (code, message) = self.code_and_message();
        let mut body = ErrorResponse::new(code, message);

        if let ApiError::Validation(errors) = self {
            for (field, field_errors) in errors.field_errors() {
                let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
                body = body.add_detail(field, codes);
            }
        }

        HttpResponse::build(status).json(body)
    }
}

/// Render malformed JSON bodies as `BAD_REQUEST` instead of actix's plain-text default
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request body");
    ApiError::bad_request(error_codes::BAD_REQUEST, "Malformed JSON body").into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: ApiError) -> serde_json::Value {
        let response = err.error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_token_errors_map_to_401_or_404() {
        assert_eq!(ApiError::from(TokenError::NoToken).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(TokenError::Revoked).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(TokenError::UserNotFound).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let err = ApiError::from(DomainError::Storage { message: "deadlock".to_string() });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_internal_error_hides_details() {
        let body = body_json(ApiError::from(DomainError::Storage {
            message: "connection refused on 10.0.0.3".to_string(),
        }))
        .await;

        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.3"));
    }

    #[actix_web::test]
    async fn test_token_codes_are_distinct() {
        let no_token = body_json(TokenError::NoToken.into()).await;
        let invalid = body_json(TokenError::InvalidToken.into()).await;

        assert_eq!(no_token["error"], "NO_TOKEN");
        assert_eq!(invalid["error"], "INVALID_TOKEN");
    }
}
