#![doc = "The `todolist` library crate."]
#![doc = ""]
#![doc = "Account registration and login with access/refresh tokens, a bearer-token gate,"]
#![doc = "per-client rate limiting, and owner-scoped task CRUD. The binary (`main.rs`)"]
#![doc = "loads configuration, picks a store and serves the routes defined here."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
