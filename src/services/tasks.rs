use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges, TaskList};
use crate::store::TaskStore;

const TASK_NOT_FOUND: &str = "task not found";
const TASK_NOT_OWNED: &str = "task belongs to another user";

/// Owner-scoped task operations.
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    pub async fn list(&self, owner_id: i32, page: i64, limit: i64) -> Result<TaskList, AppError> {
        let data = self.tasks.list(owner_id, page, limit).await?;
        let total = self.tasks.count(owner_id).await?;
        Ok(TaskList {
            data,
            page,
            limit,
            total,
        })
    }

    pub async fn create(&self, task: NewTask) -> Result<Task, AppError> {
        let task = self.tasks.insert(task).await?;
        log::info!("user {} created task {}", task.user_id, task.id);
        Ok(task)
    }

    pub async fn update(
        &self,
        id: i32,
        owner_id: i32,
        changes: TaskChanges,
    ) -> Result<Task, AppError> {
        self.check_owner(id, owner_id).await?;
        self.tasks
            .update_fields(id, owner_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))
    }

    pub async fn delete(&self, id: i32, owner_id: i32) -> Result<(), AppError> {
        self.check_owner(id, owner_id).await?;
        if !self.tasks.delete(id, owner_id).await? {
            return Err(AppError::NotFound(TASK_NOT_FOUND.into()));
        }
        log::info!("user {} deleted task {}", owner_id, id);
        Ok(())
    }

    /// Distinguishes a missing task (404) from someone else's task (403).
    async fn check_owner(&self, id: i32, owner_id: i32) -> Result<(), AppError> {
        match self.tasks.find_by_id(id).await? {
            None => Err(AppError::NotFound(TASK_NOT_FOUND.into())),
            Some(task) if task.user_id != owner_id => {
                log::warn!("user {} attempted to modify task {} of another user", owner_id, id);
                Err(AppError::Forbidden(TASK_NOT_OWNED.into()))
            }
            Some(_) => Ok(()),
        }
    }
}
