//! Orchestration between the HTTP handlers, the auth core and the stores.

pub mod accounts;
pub mod tasks;

pub use accounts::AccountService;
pub use tasks::TaskService;
