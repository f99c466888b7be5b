//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the failures of the auth core and the task endpoints, from bad credentials to
//! database faults.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into HTTP responses with JSON bodies. Internal faults are reported to the client with a
//! generic message only; their details stay in the server log.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and `BlockingError` allow
//! conversion with the `?` operator.

use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Message returned to clients for every 500-class error.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "task not found")]
    pub error: String,
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, carrying a message
/// detailing the issue. These errors are converted into HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid, expired or wrong-type token, or bad credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed request that could not be parsed (HTTP 400).
    BadRequest(String),
    /// Authenticated, but acting on a resource owned by someone else (HTTP 403).
    Forbidden(String),
    /// Requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Resource already exists, e.g. a duplicate account email (HTTP 409).
    Conflict(String),
    /// The caller's rate-limit window is exhausted (HTTP 429).
    RateLimited,
    /// Unexpected server-side error such as a hashing or signing fault (HTTP 500).
    InternalServerError(String),
    /// Error originating from the persistence layer (HTTP 500).
    DatabaseError(String),
    /// Input failed field validation (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::RateLimited => write!(f, "Too Many Requests: rate limit exceeded"),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The message that is safe to show to the client.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::RateLimited => "rate limit exceeded",
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Actix Web uses this to translate `AppError` results from handlers and
/// middleware into the right status code and a `{"error": ...}` body.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message().to_string(),
        })
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, a unique-constraint violation becomes `Conflict`,
/// and every other database error becomes `DatabaseError` (logged here, where it is detected).
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("user with this email already exists".into())
            }
            _ => {
                log::error!("database error: {}", error);
                AppError::DatabaseError(error.to_string())
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// Field messages are sorted by field name so the response is deterministic.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut messages = Vec::new();
        collect_messages(&errors, &mut messages);
        messages.sort();
        let messages: Vec<String> = messages.into_iter().map(|(_, msg)| msg).collect();
        AppError::ValidationError(messages.join("; "))
    }
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let msg = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    out.push((field.to_string(), msg));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
        }
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::InternalServerError`.
///
/// Only signing goes through this conversion; verification failures are mapped
/// to `Unauthorized` by the token service itself.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::error!("failed to sign token: {}", error);
        AppError::InternalServerError(format!("failed to sign token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        log::error!("password hashing engine failed: {}", error);
        AppError::InternalServerError(format!("password hashing failed: {}", error))
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        log::error!("blocking task failed: {}", error);
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use validator::ValidationError;

    #[test]
    fn test_error_responses() {
        let cases = vec![
            (AppError::Unauthorized("Invalid token".into()), 401),
            (AppError::BadRequest("Invalid input".into()), 400),
            (AppError::ValidationError("bad field".into()), 400),
            (AppError::Forbidden("not yours".into()), 403),
            (AppError::NotFound("Resource not found".into()), 404),
            (AppError::Conflict("exists".into()), 409),
            (AppError::RateLimited, 429),
            (AppError::InternalServerError("Server error".into()), 500),
            (AppError::DatabaseError("connection refused".into()), 500),
        ];

        for (error, status) in cases {
            assert_eq!(error.error_response().status(), status, "{}", error);
        }
    }

    #[actix_rt::test]
    async fn test_internal_details_are_not_echoed() {
        let error = AppError::DatabaseError("password authentication failed for user x".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_validation_messages_are_sorted_by_field() {
        let mut errors = ValidationErrors::new();
        let mut password = ValidationError::new("length");
        password.message = Some("password is not specified".into());
        let mut email = ValidationError::new("length");
        email.message = Some("email is not specified".into());
        errors.add("password", password);
        errors.add("email", email);

        match AppError::from(errors) {
            AppError::ValidationError(msg) => {
                assert_eq!(msg, "email is not specified; password is not specified")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
