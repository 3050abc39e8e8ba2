//! Application state and factory
//!
//! This module holds the shared application state and provides the factory
//! for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use hl_core::repositories::{IdentityRepository, RefreshLedger};
use hl_core::services::{Clock, TokenService, TokenServiceConfig};
use hl_infra::PasswordHasher;
use hl_shared::errors::{error_codes, ErrorResponse};

use crate::handlers::json_error_handler;
use crate::middleware::JwtAuth;
use crate::routes::{auth, users};

/// Token service over type-erased stores, so MySQL and in-memory backends share one app
pub type AppTokenService = TokenService<Arc<dyn RefreshLedger>, Arc<dyn IdentityRepository>>;

/// State shared by every handler
pub struct AppState {
    pub tokens: Arc<AppTokenService>,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn RefreshLedger>,
        identities: Arc<dyn IdentityRepository>,
        config: TokenServiceConfig,
        passwords: PasswordHasher,
    ) -> Self {
        Self {
            tokens: Arc::new(TokenService::new(ledger, identities, config)),
            passwords,
        }
    }

    /// Same as `new` with an explicit time source
    pub fn with_clock(
        ledger: Arc<dyn RefreshLedger>,
        identities: Arc<dyn IdentityRepository>,
        config: TokenServiceConfig,
        passwords: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens: Arc::new(TokenService::with_clock(ledger, identities, config, clock)),
            passwords,
        }
    }

    pub fn identities(&self) -> &Arc<dyn IdentityRepository> {
        self.tokens.identities()
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let jwt_auth = JwtAuth::new(app_state.tokens.authenticator());

    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/refresh", web::post().to(auth::refresh))
                        .route("/logout", web::post().to(auth::logout))
                        .service(
                            web::resource("/logout-all")
                                .wrap(jwt_auth.clone())
                                .route(web::post().to(auth::logout_all)),
                        ),
                )
                .service(
                    web::scope("/users")
                        .wrap(jwt_auth)
                        .route("/me", web::get().to(users::me)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "status": "healthy",
        "service": "habitline-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
