use actix_web::web;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::rate_limit::{RateLimiter, SlidingWindowLimiter};
use crate::services::{AccountService, TaskService};
use crate::store::{TaskStore, UserStore};

/// Shared services, built once and cloned into every worker's `App`.
#[derive(Clone)]
pub struct AppState {
    pub accounts: web::Data<AccountService>,
    pub tasks: web::Data<TaskService>,
    pub tokens: web::Data<TokenService>,
    pub limiter: web::Data<dyn RateLimiter>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, config: &Config) -> Self
    where
        S: UserStore + TaskStore + 'static,
    {
        let limiter: Arc<dyn RateLimiter> = Arc::new(SlidingWindowLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_window,
        ));
        Self::with_limiter(store, config, limiter)
    }

    /// Like [`AppState::new`], with a caller-supplied rate limiter.
    pub fn with_limiter<S>(store: Arc<S>, config: &Config, limiter: Arc<dyn RateLimiter>) -> Self
    where
        S: UserStore + TaskStore + 'static,
    {
        let tokens = Arc::new(TokenService::new(
            config.jwt_secret.as_bytes(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        ));
        let users: Arc<dyn UserStore> = store.clone();
        let task_store: Arc<dyn TaskStore> = store;

        Self {
            accounts: web::Data::new(AccountService::new(
                users,
                Arc::clone(&tokens),
                config.bcrypt_cost,
            )),
            tasks: web::Data::new(TaskService::new(task_store)),
            tokens: web::Data::from(tokens),
            limiter: web::Data::from(limiter),
        }
    }

    /// Registers the services as app data.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.accounts.clone())
            .app_data(self.tasks.clone())
            .app_data(self.tokens.clone())
            .app_data(self.limiter.clone());
    }
}
