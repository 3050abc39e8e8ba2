use actix_web::{web, HttpRequest, HttpResponse};

use hl_core::errors::DomainError;
use hl_shared::errors::error_codes;

use crate::app::AppState;
use crate::dto::{LogoutResponse, RefreshTokenRequest};
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

use super::{cleared_refresh_cookie, presented_refresh_token};

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the session of the presented refresh token (cookie or body) and
/// clears the cookie. Expired tokens are still accepted, and logging out an
/// already revoked session succeeds with `"revoked": 0`.
///
/// ## Errors
/// - 400 Bad Request: `MISSING_REFRESH`
/// - 401 Unauthorized: `INVALID_REFRESH` when the token signature does not verify
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, ApiError> {
    let (token, _) = presented_refresh_token(&req, body)?;

    let revoked = match state.tokens.revoke(&token).await {
        Ok(revoked) => revoked,
        Err(DomainError::Token(_)) => {
            return Err(ApiError::unauthorized(
                error_codes::INVALID_REFRESH,
                "Invalid refresh token",
            ))
        }
        Err(err) => return Err(err.into()),
    };

    Ok(HttpResponse::Ok()
        .cookie(cleared_refresh_cookie())
        .json(LogoutResponse {
            ok: true,
            revoked: u64::from(revoked),
        }))
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every session of the authenticated caller.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
pub async fn logout_all(
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let revoked = state.tokens.revoke_all(&auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, revoked, "Logged out of all sessions");

    Ok(HttpResponse::Ok()
        .cookie(cleared_refresh_cookie())
        .json(LogoutResponse { ok: true, revoked }))
}
