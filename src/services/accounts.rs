//! Registration, login and token refresh.

use actix_web::web;
use std::sync::Arc;

use crate::auth::{
    hash_password, verify_password, LoginRequest, RegisterRequest, TokenPair, TokenService,
    TokenType,
};
use crate::error::AppError;
use crate::models::NewUser;
use crate::store::UserStore;

/// Shared by unknown-email and wrong-password failures so neither is revealed.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    hash_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>, hash_cost: u32) -> Self {
        Self {
            users,
            tokens,
            hash_cost,
        }
    }

    /// Creates an account and signs it in.
    ///
    /// The email must not be taken; the lookup and the insert are separate statements,
    /// so a concurrent duplicate is caught by the store's uniqueness check instead.
    pub async fn register(&self, request: RegisterRequest) -> Result<TokenPair, AppError> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict(
                "user with this email already exists".into(),
            ));
        }

        let cost = self.hash_cost;
        let password = request.password;
        let password_hash = web::block(move || hash_password(&password, cost)).await??;

        let user_id = self
            .users
            .insert(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?;

        log::info!("new user {} registered", user_id);
        self.issue_pair(user_id)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AppError> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        let password = request.password;
        let stored = user.password_hash;
        let matches = web::block(move || verify_password(&password, &stored)).await??;
        if !matches {
            log::info!("failed login for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        log::info!("user {} logged in", user.id);
        self.issue_pair(user.id)
    }

    /// Exchanges a refresh token for a fresh access token. No new refresh token is issued.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let user_id = self.tokens.authorize(refresh_token, TokenType::Refresh)?;
        let token = self.issue_access_token(user_id)?;
        log::info!("refreshed access token for user {}", user_id);
        Ok(token)
    }

    pub fn issue_access_token(&self, user_id: i32) -> Result<String, AppError> {
        self.tokens.issue(user_id, TokenType::Access)
    }

    fn issue_pair(&self, user_id: i32) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            token: self.issue_access_token(user_id)?,
            refresh_token: self.tokens.issue(user_id, TokenType::Refresh)?,
        })
    }
}
