use async_trait::async_trait;
use sqlx::PgPool;

use super::{page_offset, StoreResult, TaskStore, UserStore};
use crate::models::{NewTask, NewUser, Task, TaskChanges, User};

const TASK_COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

/// PostgreSQL-backed user and task store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<i32> {
        let (id,) = sqlx::query_as::<_, (i32,)>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list(&self, owner_id: i32, page: i64, limit: i64) -> StoreResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(page_offset(page, limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn count(&self, owner_id: i32) -> StoreResult<i64> {
        let (total,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (user_id, title, description) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.user_id)
            .bind(task.title)
            .bind(task.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_fields(
        &self,
        id: i32,
        owner_id: i32,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>> {
        // NULL parameters keep the current column value.
        let sql = format!(
            "UPDATE tasks \
             SET title = COALESCE($1, title), description = COALESCE($2, description), updated_at = NOW() \
             WHERE id = $3 AND user_id = $4 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(changes.title)
            .bind(changes.description)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete(&self, id: i32, owner_id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
