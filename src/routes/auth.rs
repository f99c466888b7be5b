use crate::{
    auth::{
        bearer_token, AccessTokenResponse, LoginRequest, RegisterRequest, TokenPair,
        TokenRejection,
    },
    error::{AppError, ErrorResponse},
    services::AccountService,
};
use actix_web::{http::header, post, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates an account and returns an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = TokenPair),
        (status = 400, description = "Missing or malformed field", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
    )
)]
#[post("/register")]
pub async fn register(
    accounts: web::Data<AccountService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let tokens = accounts.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// Login user
///
/// Verifies the credentials and returns an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenPair),
        (status = 400, description = "Missing or malformed field", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
    )
)]
#[post("/login")]
pub async fn login(
    accounts: web::Data<AccountService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let tokens = accounts.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// Refresh an access token
///
/// Expects `Authorization: Bearer <refresh token>` and returns a new access token.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "auth",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Missing, invalid, expired or non-refresh token", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
    )
)]
#[post("/refresh")]
pub async fn refresh(
    accounts: web::Data<AccountService>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let refresh_token = bearer_token(header_value).ok_or(TokenRejection::Missing)?;

    let token = accounts.refresh(refresh_token)?;
    Ok(HttpResponse::Ok().json(AccessTokenResponse { token }))
}
