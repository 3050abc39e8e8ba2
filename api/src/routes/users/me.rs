use actix_web::{web, HttpResponse};

use hl_shared::errors::error_codes;

use crate::app::AppState;
use crate::dto::UserResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/users/me
///
/// Returns the caller's account. A valid token for a deleted account gets
/// 404 `USER_NOT_FOUND`.
pub async fn me(state: web::Data<AppState>, auth: AuthContext) -> Result<HttpResponse, ApiError> {
    let user = state
        .identities()
        .find_active_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(error_codes::USER_NOT_FOUND, "User not found"))?;

    Ok(HttpResponse::Ok().json(UserResponse { ok: true, user }))
}
