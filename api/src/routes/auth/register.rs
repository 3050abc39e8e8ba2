use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use hl_core::domain::entities::identity::NewAccount;
use hl_core::errors::DomainError;
use hl_shared::errors::error_codes;

use crate::app::AppState;
use crate::dto::{AuthResponse, RegisterRequest};
use crate::handlers::ApiError;

use super::{refresh_cookie, request_meta};

/// Handler for POST /api/v1/auth/register
///
/// Creates an account and signs it in. The refresh token is also set in
/// the `refresh_token` cookie for browser clients.
///
/// # Request Body
///
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "password": "secret1" }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// {
///     "ok": true,
///     "user": { "id": "...", "name": "Ada", "email": "ada@example.com", "created_at": "..." },
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "token_type": "Bearer",
///     "access_expires_in": 900,
///     "refresh_expires_in": 2592000
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Body fails validation
/// - 409 Conflict: `EMAIL_ALREADY_REGISTERED`
pub async fn register(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let password_hash = state.passwords.hash(&request.password).await?;
    let email = request.email.trim().to_lowercase();

    let account = state
        .identities()
        .create(NewAccount {
            name: request.name,
            email,
            password_hash,
        })
        .await
        .map_err(|err| match err {
            DomainError::Conflict { .. } => ApiError::conflict(
                error_codes::EMAIL_ALREADY_REGISTERED,
                "This email is already registered",
            ),
            other => other.into(),
        })?;

    let tokens = state
        .tokens
        .issue(&account.identity(), request_meta(&req))
        .await?;

    tracing::info!(user_id = %account.id, "Registered account");

    Ok(HttpResponse::Created()
        .cookie(refresh_cookie(tokens.refresh_token.clone()))
        .json(AuthResponse::with_user(tokens, account)))
}
