//! Handlers for the `/auth` resource (login, register).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::error::CoreError;
use bizdesk_core::roles::{is_known_role, ALL_ROLES, ROLE_SUPERADMIN, ROLE_USER};
use bizdesk_db::models::user::{CreateUser, User, UserInfo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Returned for both an unknown username and a wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Defaults to `user`.
    pub role: Option<String>,
}

/// Successful authentication response returned by login and register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate with username + password and receive a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .store
        .find_user_by_username(&input.username)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");
    Ok(Json(auth_response(&state, &user, "Login successful")?))
}

/// POST /api/auth/register
///
/// Create an account and receive a bearer token. Registering a `superadmin`
/// requires the caller to present a superadmin token.
pub async fn register(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let role = input.role.unwrap_or_else(|| ROLE_USER.to_string());
    if !is_known_role(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role `{role}`; expected one of: {}",
            ALL_ROLES.join(", ")
        ))));
    }
    if role == ROLE_SUPERADMIN && !caller.as_ref().is_some_and(AuthUser::is_superadmin) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only a superadmin can register another superadmin".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = state
        .store
        .create_user(&CreateUser {
            username: input.username,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        registered_by = ?caller.map(|c| c.user_id),
        "User registered",
    );
    Ok((
        StatusCode::CREATED,
        Json(auth_response(&state, &user, "User registered successfully")?),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth_response(state: &AppState, user: &User, message: &str) -> AppResult<AuthResponse> {
    let token = generate_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        message: message.to_string(),
        token,
        user: UserInfo::from(user),
    })
}
