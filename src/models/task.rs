use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, ToSchema)]
pub struct Task {
    /// Unique identifier assigned by the task store.
    pub id: i32,
    /// Owning account. Never serialized.
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub user_id: i32,
    pub title: String,
    pub description: String,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /todos`. Both fields are required.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "task title is not specified"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "task description is not specified"))]
    pub description: String,
}

/// Body of `PUT /todos/{id}`. At least one non-empty field is required.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_patch"))]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

fn validate_patch(patch: &TaskPatch) -> Result<(), ValidationError> {
    if patch.changes().is_empty() {
        let mut error = ValidationError::new("at_least_one_field");
        error.message = Some("at least one field is required".into());
        return Err(error);
    }
    Ok(())
}

impl TaskPatch {
    /// The fields to write; empty strings count as absent.
    pub fn changes(&self) -> TaskChanges {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        TaskChanges {
            title: non_empty(&self.title),
            description: non_empty(&self.description),
        }
    }
}

/// A task about to be inserted for `user_id`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: i32,
    pub title: String,
    pub description: String,
}

impl NewTask {
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        Self {
            user_id,
            title: input.title,
            description: input.description,
        }
    }
}

/// Partial update of a task; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Query parameters of `GET /todos`.
///
/// Kept as raw strings: unparsable or non-positive values fall back to defaults
/// instead of failing the request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl TaskQuery {
    /// Resolved `(page, limit)`, with `limit` capped at [`MAX_LIMIT`].
    pub fn pagination(&self) -> (i64, i64) {
        let positive = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|value| value.trim().parse::<i64>().ok())
                .filter(|value| *value > 0)
        };
        let page = positive(&self.page).unwrap_or(DEFAULT_PAGE);
        let limit = positive(&self.limit).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        (page, limit)
    }
}

/// Response of `GET /todos`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskList {
    pub data: Vec<Task>,
    pub page: i64,
    pub limit: i64,
    /// Total number of tasks the caller owns, across all pages.
    pub total: i64,
}
