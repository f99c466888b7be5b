pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub use extractors::{AuthContext, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{bearer_token, Claims, TokenRejection, TokenService, TokenType};

lazy_static! {
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Payload of `POST /register`.
///
/// Missing fields deserialize as empty strings so they are reported by validation
/// with a field-specific message.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is not specified"))]
    pub username: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "email is not specified"),
        regex(path = "EMAIL_REGEX", message = "invalid email address")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is not specified"))]
    pub password: String,
}

/// Payload of `POST /login`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "email is not specified"),
        regex(path = "EMAIL_REGEX", message = "invalid email address")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is not specified"))]
    pub password: String,
}

/// Tokens handed out after registration or login.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token for protected routes.
    pub token: String,
    /// Longer-lived token accepted only by `POST /refresh`.
    pub refresh_token: String,
}

/// Response of `POST /refresh`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let missing_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(missing_password_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            username: "test user".to_string(),
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let missing_username = RegisterRequest {
            username: "".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(missing_username.validate().is_err());

        let bad_domain = RegisterRequest {
            username: "tu".to_string(),
            email: "test@example".to_string(),
            password: "password123".to_string(),
        };
        assert!(bad_domain.validate().is_err());
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert_eq!(req.username, "");
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_token_pair_wire_names() {
        let pair = TokenPair {
            token: "a".into(),
            refresh_token: "r".into(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["token"], "a");
        assert_eq!(json["refreshToken"], "r");
    }
}
