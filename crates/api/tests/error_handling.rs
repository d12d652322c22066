//! Error envelope tests: every failure is `{ "error", "code" }` JSON.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use bizdesk_api::error::AppError;
use bizdesk_core::error::CoreError;
use bizdesk_db::StoreError;
use common::{body_json, get_auth, superadmin_token};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, json) = error_to_response(AppError::Core(CoreError::not_found("Customer", 42))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Customer with id 42 not found");
}

#[tokio::test]
async fn conflict_error_returns_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Conflict("in use".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "in use");
}

#[tokio::test]
async fn internal_details_are_not_leaked() {
    let (status, json) =
        error_to_response(AppError::InternalError("connection string leaked".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn foreign_key_violation_returns_conflict() {
    let err = AppError::from(StoreError::ForeignKeyViolation {
        constraint: "fk_tasks_customer".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn malformed_json_returns_bad_request() {
    let (app, _state) = common::build_test_app().await;
    let token = superadmin_token(app.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/customers")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn wrong_field_type_returns_bad_request() {
    let (app, _state) = common::build_test_app().await;
    let token = superadmin_token(app.clone()).await;

    let response = common::post_json_auth(
        app,
        "/api/customers",
        serde_json::json!({ "customerName": "X", "amount": "lots" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_task_returns_404_envelope() {
    let (app, _state) = common::build_test_app().await;
    let token = superadmin_token(app.clone()).await;

    let response = get_auth(app, "/api/tasks/12345", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Task with id 12345 not found");
}
