//! Authentication route handlers
//!
//! - Registration and login issue a fresh token pair
//! - Refresh rotates a refresh token
//! - Logout revokes one session, logout-all every session of the caller

pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

pub use login::login;
pub use logout::{logout, logout_all};
pub use refresh::refresh;
pub use register::register;

use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    http::header::USER_AGENT,
    web, HttpRequest,
};
use validator::Validate;

use hl_core::domain::value_objects::RequestMeta;
use hl_shared::errors::error_codes;

use crate::dto::RefreshTokenRequest;
use crate::handlers::ApiError;

/// Cookie carrying the refresh token for browser clients
pub const REFRESH_COOKIE: &str = "refresh_token";

const REFRESH_COOKIE_DAYS: i64 = 30;

/// Client metadata recorded on ledger rows
pub fn request_meta(req: &HttpRequest) -> RequestMeta {
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_owned);

    let ip = forwarded.or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()));

    RequestMeta::new(user_agent, ip)
}

/// Where a presented refresh token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    Body,
}

/// Refresh token from the cookie, else from the JSON body
pub fn presented_refresh_token(
    req: &HttpRequest,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Result<(String, TokenSource), ApiError> {
    if let Some(cookie) = req.cookie(REFRESH_COOKIE) {
        if !cookie.value().is_empty() {
            return Ok((cookie.value().to_string(), TokenSource::Cookie));
        }
    }

    let body = body.map(web::Json::into_inner).unwrap_or_default();
    match body.refresh_token {
        Some(token) if body.validate().is_ok() => Ok((token, TokenSource::Body)),
        _ => Err(ApiError::bad_request(
            error_codes::MISSING_REFRESH,
            "A refresh token is required",
        )),
    }
}

/// HttpOnly cookie handing a refresh token to a browser
pub fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::days(REFRESH_COOKIE_DAYS))
        .finish()
}

/// Cookie that makes the browser drop its refresh token
pub fn cleared_refresh_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(REFRESH_COOKIE, "")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .finish();
    cookie.make_removal();
    cookie
}
