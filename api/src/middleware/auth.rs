//! JWT authentication middleware for protecting API endpoints.
//!
//! The middleware reads the `Authorization` header, verifies the bearer
//! access token through the core `RequestAuthenticator`, and injects the
//! caller's identity into request extensions as an [`AuthContext`].
//! Rejected requests never reach the wrapped service.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use hl_core::domain::entities::identity::Identity;
use hl_core::errors::TokenError;
use hl_core::services::RequestAuthenticator;

use crate::handlers::ApiError;

/// Authenticated caller injected into requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// User ID from the access token
    pub user_id: String,
    /// Email from the access token
    pub email: String,
}

impl From<Identity> for AuthContext {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.id,
            email: identity.email,
        }
    }
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    authenticator: RequestAuthenticator,
}

impl JwtAuth {
    pub fn new(authenticator: RequestAuthenticator) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    authenticator: RequestAuthenticator,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match self.authenticator.authenticate(header) {
            Ok(identity) => {
                req.extensions_mut().insert(AuthContext::from(identity));
                let service = Rc::clone(&self.service);
                Box::pin(async move { service.call(req).await.map(|res| res.map_into_left_body()) })
            }
            Err(err) => {
                tracing::debug!(path = %req.path(), code = err.code(), "Rejected unauthenticated request");
                let response = ApiError::from(err).error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::from(TokenError::NoToken));

        ready(result)
    }
}
