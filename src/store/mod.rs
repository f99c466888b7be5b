//! Persistence collaborators.
//!
//! The services only see these traits. [`postgres::PgStore`] is the production
//! implementation; [`memory::MemoryStore`] keeps everything in process and backs
//! the tests and database-less local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive email lookup. A miss is `Ok(None)`.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts an account and returns its id. A duplicate email is `AppError::Conflict`.
    async fn insert(&self, user: NewUser) -> StoreResult<i32>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// One page of the owner's tasks, ordered by id.
    async fn list(&self, owner_id: i32, page: i64, limit: i64) -> StoreResult<Vec<Task>>;

    /// Number of tasks the owner has in total.
    async fn count(&self, owner_id: i32) -> StoreResult<i64>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Task>>;

    async fn insert(&self, task: NewTask) -> StoreResult<Task>;

    /// Applies `changes` to the task if `owner_id` owns it; `Ok(None)` when no row matched.
    async fn update_fields(
        &self,
        id: i32,
        owner_id: i32,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>>;

    /// Deletes the task if `owner_id` owns it; `Ok(false)` when no row matched.
    async fn delete(&self, id: i32, owner_id: i32) -> StoreResult<bool>;
}

/// Zero-based row offset of `page`.
pub(crate) fn page_offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit)
}
