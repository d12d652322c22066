//! Handlers for the `/customers` resource.
//!
//! Every write runs the ledger derivation: `dueDate` and `balance` in a
//! response are always computed server-side, never echoed from the request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::derivation::Ledger;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use bizdesk_db::models::customer::{CreateCustomer, CustomerView, UpdateCustomer};
use bizdesk_db::resolver;
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAuth;
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/customers
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateCustomer>,
) -> AppResult<(StatusCode, Json<CustomerView>)> {
    resolver::ensure_contractor(state.store(), input.contractor_id).await?;

    let new_customer = input.into_new(Utc::now());
    let customer = state.store.create_customer(&new_customer).await?;
    tracing::info!(
        customer_id = customer.id,
        user_id = user.user_id,
        balance = customer.balance,
        due_date = ?customer.due_date,
        "Customer created",
    );

    let view = resolver::expand_customer(state.store(), customer).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/customers
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CustomerView>>> {
    let customers = state.store.list_customers().await?;
    Ok(Json(resolver::expand_customers(state.store(), customers).await?))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CustomerView>> {
    let customer = state
        .store
        .find_customer(id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Customer", id)))?;
    Ok(Json(resolver::expand_customer(state.store(), customer).await?))
}

/// PUT /api/customers/{id}
///
/// Partial update. Fields not present are preserved; the schedule and
/// payment groups are re-derived only when the payload touches them.
/// `contractorId: null` detaches the contractor.
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateCustomer>,
) -> AppResult<Json<CustomerView>> {
    resolver::ensure_contractor(state.store(), input.attached_contractor()).await?;

    let customer = state
        .store
        .update_customer(id, input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Customer", id)))?;
    Ok(Json(resolver::expand_customer(state.store(), customer).await?))
}

/// DELETE /api/customers/{id}
///
/// Rejected while any task references the customer.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !state.store.delete_customer(id).await? {
        return Err(AppError::Core(CoreError::not_found("Customer", id)));
    }
    tracing::info!(customer_id = id, user_id = user.user_id, "Customer deleted");
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}

/// POST /api/customers/preview
///
/// Run the ledger derivation on an unsaved, possibly partial form and return
/// the derived values. Nothing is persisted.
pub async fn preview(
    RequireAuth(_user): RequireAuth,
    ValidatedJson(input): ValidatedJson<UpdateCustomer>,
) -> AppResult<Json<Ledger>> {
    Ok(Json(Ledger::from_input(&input.ledger_input(), Utc::now())))
}
