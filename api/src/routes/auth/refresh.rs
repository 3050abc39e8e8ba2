use actix_web::{web, HttpRequest, HttpResponse};

use hl_core::errors::DomainError;
use hl_shared::errors::error_codes;

use crate::app::AppState;
use crate::dto::{AuthResponse, RefreshTokenRequest};
use crate::handlers::ApiError;

use super::{presented_refresh_token, refresh_cookie, request_meta, TokenSource};

/// Handler for POST /api/v1/auth/refresh
///
/// Rotates a refresh token. Browsers send it in the `refresh_token` cookie,
/// other clients in the body:
///
/// ```json
/// { "refresh_token": "eyJ..." }
/// ```
///
/// `refreshToken` is accepted as an alias. A token read from the cookie is
/// answered with the rotated token set back in the cookie.
///
/// ## Errors
/// - 400 Bad Request: `MISSING_REFRESH`
/// - 401 Unauthorized: `INVALID_REFRESH` for any token that cannot be rotated
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, ApiError> {
    let (token, source) = presented_refresh_token(&req, body)?;

    let tokens = match state.tokens.rotate(&token, request_meta(&req)).await {
        Ok(tokens) => tokens,
        Err(DomainError::Token(err)) => {
            tracing::info!(code = err.code(), "Refresh rejected");
            return Err(ApiError::unauthorized(
                error_codes::INVALID_REFRESH,
                "Invalid refresh token",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let mut response = HttpResponse::Ok();
    if source == TokenSource::Cookie {
        response.cookie(refresh_cookie(tokens.refresh_token.clone()));
    }

    Ok(response.json(AuthResponse::new(tokens)))
}
