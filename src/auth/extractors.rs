use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// Verified identity attached to a request by `AuthMiddleware`.
///
/// This is the only value the gate places in request extensions; handlers read it
/// through the [`AuthenticatedUser`] extractor rather than by key lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i32,
}

/// Extracts the authenticated account id for a protected route.
///
/// Fails with `401` if the request did not pass through `AuthMiddleware`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub i32);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>() {
            Some(ctx) => ready(Ok(AuthenticatedUser(ctx.user_id))),
            None => {
                log::error!("protected route {} reached without auth context", req.path());
                let err = AppError::Unauthorized("no authorization token".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthContext { user_id: 123 });

        let mut payload = Payload::None;
        let extracted = AuthenticatedUser::from_request(&req, &mut payload).await;
        assert_eq!(extracted.unwrap().0, 123);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // A bare integer in extensions is not an auth context.
        req.extensions_mut().insert(123_i32);

        let mut payload = Payload::None;
        let result = AuthenticatedUser::from_request(&req, &mut payload).await;

        let err = result.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
