//! Handlers for the `/employees` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use bizdesk_db::models::employee::{CreateEmployee, Employee, UpdateEmployee};

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAuth;
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/employees
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateEmployee>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let employee = state.store.create_employee(&input).await?;
    tracing::info!(employee_id = employee.id, user_id = user.user_id, "Employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /api/employees
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Employee>>> {
    Ok(Json(state.store.list_employees().await?))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Employee>> {
    let employee = state
        .store
        .find_employee(id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Employee", id)))?;
    Ok(Json(employee))
}

/// PUT /api/employees/{id}
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateEmployee>,
) -> AppResult<Json<Employee>> {
    let employee = state
        .store
        .update_employee(id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Employee", id)))?;
    Ok(Json(employee))
}

/// DELETE /api/employees/{id}
///
/// Rejected while any task is assigned to the employee.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !state.store.delete_employee(id).await? {
        return Err(AppError::Core(CoreError::not_found("Employee", id)));
    }
    tracing::info!(employee_id = id, user_id = user.user_id, "Employee deleted");
    Ok(Json(MessageResponse::new("Employee deleted successfully")))
}
