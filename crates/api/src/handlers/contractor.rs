//! Handlers for the `/contractors` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use bizdesk_db::models::contractor::{Contractor, CreateContractor, UpdateContractor};

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAuth;
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/contractors
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateContractor>,
) -> AppResult<(StatusCode, Json<Contractor>)> {
    let contractor = state.store.create_contractor(&input).await?;
    tracing::info!(contractor_id = contractor.id, user_id = user.user_id, "Contractor created");
    Ok((StatusCode::CREATED, Json(contractor)))
}

/// GET /api/contractors
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Contractor>>> {
    Ok(Json(state.store.list_contractors().await?))
}

/// GET /api/contractors/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Contractor>> {
    let contractor = state
        .store
        .find_contractor(id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Contractor", id)))?;
    Ok(Json(contractor))
}

/// PUT /api/contractors/{id}
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateContractor>,
) -> AppResult<Json<Contractor>> {
    let contractor = state
        .store
        .update_contractor(id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Contractor", id)))?;
    Ok(Json(contractor))
}

/// DELETE /api/contractors/{id}
///
/// Customers and tasks that referenced the contractor keep existing with a
/// null `contractorId`.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !state.store.delete_contractor(id).await? {
        return Err(AppError::Core(CoreError::not_found("Contractor", id)));
    }
    tracing::info!(contractor_id = id, user_id = user.user_id, "Contractor deleted");
    Ok(Json(MessageResponse::new("Contractor deleted successfully")))
}
