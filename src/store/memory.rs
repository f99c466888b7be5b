use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{page_offset, StoreResult, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tasks: BTreeMap<i32, Task>,
    next_task_id: i32,
}

/// In-process user and task store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<i32> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(
                "user with this email already exists".into(),
            ));
        }
        let id = tables.users.len() as i32 + 1;
        tables.users.push(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        });
        Ok(id)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(&self, owner_id: i32, page: i64, limit: i64) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let offset = page_offset(page, limit);
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.user_id == owner_id)
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn count(&self, owner_id: i32) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.values().filter(|t| t.user_id == owner_id).count() as i64)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        tables.next_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.next_task_id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_fields(
        &self,
        id: i32,
        owner_id: i32,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        let Some(task) = tables.tasks.get_mut(&id).filter(|t| t.user_id == owner_id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: i32, owner_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.tasks.get(&id) {
            Some(task) if task.user_id == owner_id => {
                tables.tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
