#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, App,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use todolist::auth::TokenPair;
use todolist::store::MemoryStore;
use todolist::{routes, AppState, Config};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        database_url: None,
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        access_token_ttl: Duration::from_secs(15 * 60),
        refresh_token_ttl: Duration::from_secs(24 * 60 * 60),
        rate_limit_requests: 1000,
        rate_limit_window: Duration::from_secs(60),
        bcrypt_cost: 4, // bcrypt's minimum cost
    }
}

pub fn test_state(config: &Config) -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), config)
}

pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .configure(move |cfg| state.configure(cfg))
            .configure(routes::config),
    )
    .await
}

/// Sends a JSON request and returns the status with the parsed body (`Null` when empty).
pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("non-JSON body: {:?}", String::from_utf8_lossy(&body))
        })
    };
    (status, json)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> TokenPair {
    let req = test::TestRequest::post().uri("/register").set_json(json!({
        "username": "tester",
        "email": email,
        "password": password
    }));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
    serde_json::from_value(body).expect("token pair")
}
