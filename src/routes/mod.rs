pub mod auth;
pub mod docs;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::rate_limit::RateLimit;

/// Registers every route.
///
/// Expects `web::Data` for `AccountService`, `TaskService`, `TokenService` and
/// `dyn RateLimiter` on the app. Everything except `/health` and the OpenAPI
/// document is rate-limited; `/todos` additionally requires an access token.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::health)
        .service(docs::openapi_json)
        .service(
            web::scope("")
                .wrap(RateLimit)
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh)
                .service(
                    web::scope("/todos")
                        .wrap(AuthMiddleware)
                        .service(tasks::list_tasks)
                        .service(tasks::create_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                ),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("rejected request body: {}", err);
        AppError::BadRequest("failed to parse request body".into()).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        log::debug!("rejected path: {}", err);
        AppError::BadRequest("incorrect id".into()).into()
    })
}
