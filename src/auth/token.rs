use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Value of the `iss` claim on every token this service signs.
pub const ISSUER: &str = "todolistApp";

/// The two kinds of token handed out at registration and login.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// Claims as they are signed.
#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    iss: &'a str,
    uid: i32,
    #[serde(rename = "type")]
    token_type: TokenType,
    exp: i64,
}

/// Claims decoded from a token whose signature checked out.
///
/// Every field is optional: a correctly signed token with missing claims is still
/// distinguishable from a forged one, and the caller decides how to reject it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Claims {
    #[serde(default)]
    pub iss: Option<String>,
    /// Subject account id. Kept as raw JSON so a malformed value is reported as such.
    #[serde(default)]
    pub uid: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
    /// Expiration timestamp (seconds since epoch).
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// The subject id, if present and a valid account id.
    pub fn subject(&self) -> Option<i32> {
        self.uid
            .as_ref()
            .and_then(|uid| uid.as_i64())
            .and_then(|uid| i32::try_from(uid).ok())
    }
}

/// Why a bearer token was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Missing,
    Invalid,
    Expired,
    WrongType,
    InvalidClaims,
}

impl TokenRejection {
    pub fn message(&self) -> &'static str {
        match self {
            TokenRejection::Missing => "no authorization token",
            TokenRejection::Invalid => "failed to validate token",
            TokenRejection::Expired => "token expired",
            TokenRejection::WrongType => "invalid type of token",
            TokenRejection::InvalidClaims => "token with invalid claims",
        }
    }
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<TokenRejection> for AppError {
    fn from(rejection: TokenRejection) -> AppError {
        AppError::Unauthorized(rejection.message().to_string())
    }
}

/// Issues and validates HS256-signed access and refresh tokens.
///
/// Stateless: a token is valid purely by signature and claims at verification time.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry and type are judged by `authorize`, not by the signature check.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    /// Signs a token of `token_type` for `user_id`, expiring after the configured TTL.
    pub fn issue(&self, user_id: i32, token_type: TokenType) -> Result<String, AppError> {
        self.issue_with_ttl(user_id, token_type, self.ttl(token_type))
    }

    pub fn issue_with_ttl(
        &self,
        user_id: i32,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::InternalServerError(format!("invalid token ttl: {}", e)))?;
        let expiration = chrono::Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("token expiry overflow".into()))?
            .timestamp();

        let claims = IssuedClaims {
            iss: ISSUER,
            uid: user_id,
            token_type,
            exp: expiration,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        log::debug!("issued {} token for user {}", token_type.as_str(), user_id);
        Ok(token)
    }

    /// Checks the signature and algorithm of `token` and decodes its claims.
    ///
    /// Does not look at `exp` or `type`; see [`TokenService::authorize`].
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("token rejected at signature check: {}", e);
                AppError::Unauthorized(TokenRejection::Invalid.message().to_string())
            })
    }

    /// Runs the full acceptance sequence for a bearer token and returns its subject id.
    ///
    /// Order matters: signature, then expiry, then type, then subject.
    pub fn authorize(&self, token: &str, expected: TokenType) -> Result<i32, TokenRejection> {
        if token.is_empty() {
            return Err(TokenRejection::Missing);
        }
        let claims = self
            .validate(token)
            .map_err(|_| TokenRejection::Invalid)?;

        match claims.exp {
            Some(exp) if chrono::Utc::now().timestamp() <= exp => {}
            _ => return Err(TokenRejection::Expired),
        }
        if claims.token_type.as_deref() != Some(expected.as_str()) {
            return Err(TokenRejection::WrongType);
        }
        claims.subject().ok_or(TokenRejection::InvalidClaims)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
///
/// Returns `None` when the header is absent, not a bearer credential, or empty.
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    let (scheme, token) = header_value?.trim_start().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &[u8] = b"test_secret_for_tokens";

    fn service() -> TokenService {
        TokenService::new(
            SECRET,
            Duration::from_secs(60 * 15),
            Duration::from_secs(60 * 60 * 24),
        )
    }

    fn sign_raw(claims: serde_json::Value, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn in_hours(hours: i64) -> i64 {
        (chrono::Utc::now() + chrono::Duration::hours(hours)).timestamp()
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let token = tokens.issue(1, TokenType::Access).unwrap();
        let claims = tokens.validate(&token).unwrap();

        assert_eq!(claims.subject(), Some(1));
        assert_eq!(claims.iss.as_deref(), Some(ISSUER));
        assert_eq!(claims.token_type.as_deref(), Some("access"));
        assert!(claims.exp.unwrap() > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_access_and_refresh_expiries_follow_their_ttls() {
        let tokens = service();
        let access = tokens.validate(&tokens.issue(7, TokenType::Access).unwrap()).unwrap();
        let refresh = tokens.validate(&tokens.issue(7, TokenType::Refresh).unwrap()).unwrap();

        assert!(access.exp.unwrap() < refresh.exp.unwrap());
    }

    #[test]
    fn test_authorize_accepts_matching_type() {
        let tokens = service();
        let access = tokens.issue(42, TokenType::Access).unwrap();
        let refresh = tokens.issue(42, TokenType::Refresh).unwrap();

        assert_eq!(tokens.authorize(&access, TokenType::Access), Ok(42));
        assert_eq!(tokens.authorize(&refresh, TokenType::Refresh), Ok(42));
    }

    #[test]
    fn test_authorize_rejects_wrong_type() {
        let tokens = service();
        let access = tokens.issue(42, TokenType::Access).unwrap();
        let refresh = tokens.issue(42, TokenType::Refresh).unwrap();

        assert_eq!(
            tokens.authorize(&access, TokenType::Refresh),
            Err(TokenRejection::WrongType)
        );
        assert_eq!(
            tokens.authorize(&refresh, TokenType::Access),
            Err(TokenRejection::WrongType)
        );
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let expired = sign_raw(
            json!({ "iss": ISSUER, "uid": 2, "type": "access", "exp": in_hours(-2) }),
            SECRET,
        );

        // Signature is fine, so validate still succeeds.
        assert!(tokens.validate(&expired).is_ok());
        assert_eq!(
            tokens.authorize(&expired, TokenType::Access),
            Err(TokenRejection::Expired)
        );
    }

    #[test]
    fn test_missing_exp_counts_as_expired() {
        let tokens = service();
        let token = sign_raw(json!({ "uid": 2, "type": "access" }), SECRET);

        assert_eq!(
            tokens.authorize(&token, TokenType::Access),
            Err(TokenRejection::Expired)
        );
    }

    #[test]
    fn test_invalid_token_signature() {
        let tokens = service();
        // Expired as well: the signature check must win.
        let forged = sign_raw(
            json!({ "uid": 1, "type": "access", "exp": in_hours(-1) }),
            b"a_completely_different_secret",
        );

        match tokens.validate(&forged) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "failed to validate token"),
            other => panic!("Token should have been rejected, got {:?}", other),
        }
        assert_eq!(
            tokens.authorize(&forged, TokenType::Access),
            Err(TokenRejection::Invalid)
        );
    }

    #[test]
    fn test_unexpected_algorithm_is_rejected() {
        let tokens = service();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &json!({ "uid": 1, "type": "access", "exp": in_hours(1) }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            tokens.authorize(&token, TokenType::Access),
            Err(TokenRejection::Invalid)
        );
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let tokens = service();
        assert_eq!(
            tokens.authorize("not.a.jwt", TokenType::Access),
            Err(TokenRejection::Invalid)
        );
        assert_eq!(
            tokens.authorize("", TokenType::Access),
            Err(TokenRejection::Missing)
        );
    }

    #[test]
    fn test_missing_or_malformed_subject() {
        let tokens = service();
        let no_uid = sign_raw(json!({ "type": "access", "exp": in_hours(1) }), SECRET);
        let text_uid = sign_raw(
            json!({ "uid": "one", "type": "access", "exp": in_hours(1) }),
            SECRET,
        );

        assert_eq!(
            tokens.authorize(&no_uid, TokenType::Access),
            Err(TokenRejection::InvalidClaims)
        );
        assert_eq!(
            tokens.authorize(&text_uid, TokenType::Access),
            Err(TokenRejection::InvalidClaims)
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer   abc  ")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("BEARER\tabc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearerabc")), None);
        assert_eq!(bearer_token(Some("Bearer")), None);
    }
}
