//! HTTP-level tests for login, registration and token enforcement.

mod common;

use axum::http::StatusCode;
use bizdesk_api::auth::jwt::{generate_token, validate_token, TOKEN_TTL_HOURS};
use common::{body_json, get_auth, post_json, post_json_auth, superadmin_token};
use serde_json::json;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn superadmin_can_log_in() {
    let (app, state) = common::build_test_app().await;

    let body = json!({ "username": "superadmin", "password": common::SUPERADMIN_PASSWORD });
    let response = post_json(app, "/api/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Login successful");

    // The token names the logged-in user and lives for 24 hours.
    let claims = validate_token(json["token"].as_str().unwrap(), &state.config.jwt)
        .expect("issued token should validate");
    assert_eq!(json["user"]["id"], claims.sub);
    assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    assert_eq!(claims.exp - claims.iat, 24 * 3600);
    assert_eq!(json["user"]["username"], "superadmin");
    assert_eq!(json["user"]["role"], "superadmin");
    assert!(json["user"].get("passwordHash").is_none());
}

/// Wrong password and unknown username are indistinguishable.
#[tokio::test]
async fn failed_logins_share_one_message() {
    let (app, _state) = common::build_test_app().await;

    let wrong_password = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "username": "superadmin", "password": "not-the-password" }),
    )
    .await;
    let unknown_user = post_json(
        app,
        "/api/auth/login",
        json!({ "username": "ghost", "password": "whatever" }),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_user).await;
    assert_eq!(a["error"], "Invalid credentials");
    assert_eq!(a, b);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let (app, _state) = common::build_test_app().await;

    let response = post_json(app, "/api/auth/login", json!({ "username": "superadmin" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_defaults_to_user_role() {
    let (app, _state) = common::build_test_app().await;

    let response = post_json(
        app.clone(),
        "/api/auth/register",
        json!({ "username": "alice", "password": "secret1" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "User registered successfully");
    assert_eq!(json["user"]["role"], "user");

    // The returned token works immediately.
    let token = json["token"].as_str().unwrap();
    let response = get_auth(app, "/api/employees", token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn registering_superadmin_needs_superadmin_caller() {
    let (app, _state) = common::build_test_app().await;
    let body = json!({ "username": "root2", "password": "secret12", "role": "superadmin" });

    let anonymous = post_json(app.clone(), "/api/auth/register", body.clone()).await;
    assert_eq!(anonymous.status(), StatusCode::FORBIDDEN);

    let user = post_json(
        app.clone(),
        "/api/auth/register",
        json!({ "username": "bob", "password": "secret1" }),
    )
    .await;
    let user_token = body_json(user).await["token"].as_str().unwrap().to_string();
    let as_user = post_json_auth(app.clone(), "/api/auth/register", body.clone(), &user_token).await;
    assert_eq!(as_user.status(), StatusCode::FORBIDDEN);

    let admin_token = superadmin_token(app.clone()).await;
    let as_admin = post_json_auth(app, "/api/auth/register", body, &admin_token).await;
    assert_eq!(as_admin.status(), StatusCode::CREATED);
    assert_eq!(body_json(as_admin).await["user"]["role"], "superadmin");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (app, state) = common::build_test_app().await;
    let body = json!({ "username": "carol", "password": "secret1" });

    let first = post_json(app.clone(), "/api/auth/register", body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_id = body_json(first).await["user"]["id"].as_i64().unwrap();

    let second = post_json(
        app.clone(),
        "/api/auth/register",
        json!({ "username": "carol", "password": "different1" }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(second).await["error"], "Username already exists");

    // The original account is untouched and no other record was written.
    let stored = state
        .store
        .find_user_by_username("carol")
        .await
        .unwrap()
        .expect("first registration persists");
    assert_eq!(stored.id, first_id);
    assert!(state.store.find_user(first_id + 1).await.unwrap().is_none());

    let login = post_json(app, "/api/auth/login", body).await;
    assert_eq!(login.status(), StatusCode::OK);
    assert_eq!(body_json(login).await["user"]["id"], first_id);
}

#[tokio::test]
async fn short_password_and_unknown_role_are_rejected() {
    let (app, _state) = common::build_test_app().await;

    let short = post_json(
        app.clone(),
        "/api/auth/register",
        json!({ "username": "dave", "password": "12345" }),
    )
    .await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(short).await["code"], "VALIDATION_ERROR");

    let bad_role = post_json(
        app,
        "/api/auth/register",
        json!({ "username": "erin", "password": "secret1", "role": "admin" }),
    )
    .await;
    assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Token enforcement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_routes_require_a_token() {
    let (app, _state) = common::build_test_app().await;

    for uri in ["/api/employees", "/api/contractors", "/api/customers", "/api/tasks"] {
        let response = common::get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "GET {uri}");
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (app, _state) = common::build_test_app().await;

    let response = get_auth(app, "/api/customers", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A well-signed token whose user is gone is refused.
#[tokio::test]
async fn token_for_missing_user_is_rejected() {
    let (app, state) = common::build_test_app().await;
    let token = generate_token(9_999, &state.config.jwt).unwrap();

    let response = get_auth(app, "/api/customers", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "User no longer exists");
}
