use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use hl_shared::errors::error_codes;

use crate::app::AppState;
use crate::dto::{AuthResponse, LoginRequest};
use crate::handlers::ApiError;

use super::{refresh_cookie, request_meta};

/// Handler for POST /api/v1/auth/login
///
/// Checks email and password and issues a token pair. Unknown emails and
/// wrong passwords get the same `INVALID_CREDENTIALS` reply and cost the
/// same bcrypt verification. The refresh token is also set as a cookie.
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let invalid = || ApiError::unauthorized(error_codes::INVALID_CREDENTIALS, "Invalid email or password");

    let email = request.email.trim().to_lowercase();
    let credentials = match state.identities().find_credentials_by_email(&email).await? {
        Some(credentials) => credentials,
        None => {
            state.passwords.verify_without_account(&request.password).await?;
            return Err(invalid());
        }
    };

    if !state
        .passwords
        .verify(&request.password, &credentials.password_hash)
        .await?
    {
        tracing::info!(user_id = %credentials.account.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let tokens = state
        .tokens
        .issue(&credentials.account.identity(), request_meta(&req))
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(tokens.refresh_token.clone()))
        .json(AuthResponse::with_user(tokens, credentials.account)))
}
