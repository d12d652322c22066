#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bizdesk_api::app::build_app;
use bizdesk_api::auth::jwt::JwtConfig;
use bizdesk_api::bootstrap::ensure_superadmin;
use bizdesk_api::config::{LogFormat, ServerConfig, StoreBackend};
use bizdesk_api::state::AppState;
use bizdesk_db::MemoryStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SUPERADMIN_PASSWORD: &str = "test-superadmin-pass";

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store: StoreBackend::Memory,
        jwt: JwtConfig::new("integration-test-secret"),
        superadmin_password: SUPERADMIN_PASSWORD.to_string(),
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over a fresh in-memory store, with the
/// superadmin account provisioned the way `main.rs` does it.
///
/// Returns the state as well so tests can mint tokens or seed the store.
pub async fn build_test_app() -> (Router, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store, test_config());
    ensure_superadmin(state.store(), &state.config)
        .await
        .expect("superadmin bootstrap should succeed");
    let app = build_app(state.clone()).expect("test CORS origins are valid");
    (app, state)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Log in through the API and return the bearer token.
pub async fn login(app: Router, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(response.status(), 200, "login as {username} should succeed");
    body_json(response).await["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

pub async fn superadmin_token(app: Router) -> String {
    login(app, "superadmin", SUPERADMIN_PASSWORD).await
}

/// POST `body` to `uri` and return the created record's JSON, asserting 201.
pub async fn create(app: Router, uri: &str, body: Value, token: &str) -> Value {
    let response = post_json_auth(app, uri, body, token).await;
    assert_eq!(response.status(), 201, "POST {uri} should create");
    body_json(response).await
}
