use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use sqlx::PgPool;
use std::io;
use std::sync::Arc;

use todolist::store::{MemoryStore, PgStore};
use todolist::{routes, AppState, Config};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = PgPool::connect(database_url)
                .await
                .map_err(|e| startup_error("failed to connect to database", e))?;
            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .map_err(|e| startup_error("failed to run migrations", e))?;
            AppState::new(Arc::new(store), &config)
        }
        None => {
            log::warn!("DATABASE_URL is not set; data is kept in memory only");
            AppState::new(Arc::new(MemoryStore::new()), &config)
        }
    };

    log::info!("Starting todolist server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
