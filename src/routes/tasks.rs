use crate::{
    auth::AuthenticatedUser,
    error::{AppError, ErrorResponse},
    models::{NewTask, Task, TaskInput, TaskList, TaskPatch, TaskQuery},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists the authenticated user's tasks, one page at a time.
///
/// ## Query Parameters:
/// - `page` (optional, default 1)
/// - `limit` (optional, default 10, at most 100)
///
/// ## Responses:
/// - `200 OK`: `{ "data": [Task], "page", "limit", "total" }`
/// - `401 Unauthorized`
#[utoipa::path(
    get,
    path = "/todos",
    tag = "tasks",
    security(("bearer_token" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
    ),
    responses(
        (status = 200, description = "One page of the caller's tasks", body = TaskList),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
    )
)]
#[get("")]
pub async fn list_tasks(
    tasks: web::Data<TaskService>,
    query: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (page, limit) = query.pagination();
    let list = tasks.list(user.0, page, limit).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Creates a task owned by the authenticated user.
///
/// ## Responses:
/// - `202 Accepted`: the stored `Task`
/// - `400 Bad Request`: unparsable body, or missing title or description
/// - `401 Unauthorized`
#[utoipa::path(
    post,
    path = "/todos",
    tag = "tasks",
    security(("bearer_token" = [])),
    request_body = TaskInput,
    responses(
        (status = 202, description = "Task created", body = Task),
        (status = 400, description = "Missing title or description", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
    )
)]
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = tasks
        .create(NewTask::new(task_data.into_inner(), user.0))
        .await?;
    Ok(HttpResponse::Accepted().json(task))
}

/// Updates the title and/or description of a task.
///
/// ## Responses:
/// - `202 Accepted`: the updated `Task`
/// - `400 Bad Request`: non-numeric id, or neither field given
/// - `401 Unauthorized`
/// - `403 Forbidden`: the task belongs to another user
/// - `404 Not Found`
#[utoipa::path(
    put,
    path = "/todos/{id}",
    tag = "tasks",
    security(("bearer_token" = [])),
    params(("id" = i32, Path, description = "Task id")),
    request_body = TaskPatch,
    responses(
        (status = 202, description = "Task updated", body = Task),
        (status = 400, description = "Non-numeric id or no field given", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Task belongs to another user", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
    patch: web::Json<TaskPatch>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    let task = tasks
        .update(task_id.into_inner(), user.0, patch.changes())
        .await?;
    Ok(HttpResponse::Accepted().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`
/// - `400 Bad Request`: non-numeric id
/// - `401 Unauthorized`
/// - `403 Forbidden`: the task belongs to another user
/// - `404 Not Found`
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    tag = "tasks",
    security(("bearer_token" = [])),
    params(("id" = i32, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Task belongs to another user", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete(task_id.into_inner(), user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}
