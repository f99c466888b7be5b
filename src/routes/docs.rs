//! Generated OpenAPI document for the public routes.

use actix_web::{get, HttpResponse, Responder};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::Components;
use utoipa::{Modify, OpenApi};

use crate::auth::{AccessTokenResponse, LoginRequest, RegisterRequest, TokenPair};
use crate::error::ErrorResponse;
use crate::models::{Task, TaskInput, TaskList, TaskPatch};
use crate::routes::{auth, health, tasks};

/// Location of the served document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::refresh,
        tasks::list_tasks,
        tasks::create_task,
        tasks::update_task,
        tasks::delete_task,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        TokenPair,
        AccessTokenResponse,
        Task,
        TaskInput,
        TaskPatch,
        TaskList,
        ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "tasks", description = "The caller's own task list"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Declares the `bearer_token` scheme referenced by the protected operations.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Components::new);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Serves the OpenAPI document. Not rate-limited and needs no token.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
