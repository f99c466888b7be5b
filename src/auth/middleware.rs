use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthContext;
use crate::auth::token::{bearer_token, TokenRejection, TokenService, TokenType};
use crate::error::AppError;

/// Gate for protected routes.
///
/// Requires `Authorization: Bearer <access token>`, verifies it with the
/// `TokenService` registered as app data, and attaches an [`AuthContext`] for
/// the handlers. Rejections are answered here with `401` and never reach the
/// wrapped service.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(ctx) => {
                req.extensions_mut().insert(ctx);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                log::warn!("unauthorized {} {}", req.method(), req.path());
                let response = app_err.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<AuthContext, AppError> {
    let tokens = req.app_data::<web::Data<TokenService>>().ok_or_else(|| {
        log::error!("TokenService is not registered as app data");
        AppError::InternalServerError("token service unavailable".into())
    })?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header_value).ok_or(TokenRejection::Missing)?;

    let user_id = tokens
        .authorize(token, TokenType::Access)
        .map_err(|rejection| {
            log::debug!("rejected request to {}: {}", req.path(), rejection);
            rejection
        })?;

    Ok(AuthContext { user_id })
}
