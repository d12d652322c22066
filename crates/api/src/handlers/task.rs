//! Handlers for the `/tasks` resource.
//!
//! Every task in a response has its `customerId`, `employeeId` and
//! `contractorId` expanded to summaries by [`bizdesk_db::resolver`].

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use bizdesk_db::models::status::{TaskPriority, TaskStatus};
use bizdesk_db::models::task::{CreateTask, TaskFilter, TaskStats, TaskView, UpdateTask};
use bizdesk_db::resolver::{self, TaskAssignment};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::RequireAuth;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Query parameters for `GET /tasks` (`?status=&priority=&search=`).
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
}

impl From<TaskListParams> for TaskFilter {
    fn from(params: TaskListParams) -> Self {
        TaskFilter {
            status: params.status,
            priority: params.priority,
            search: params.search,
            ..Default::default()
        }
    }
}

/// POST /api/tasks
///
/// The contractor and due date are resolved from the customer; the task
/// keeps them even if the customer changes later.
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> AppResult<(StatusCode, Json<TaskView>)> {
    let view = resolver::create_task(state.store(), input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/tasks
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    params: Result<Query<TaskListParams>, QueryRejection>,
) -> AppResult<Json<Vec<TaskView>>> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let tasks = resolver::list_tasks(state.store(), &params.into()).await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskView>> {
    Ok(Json(resolver::find_task(state.store(), id).await?))
}

/// PUT /api/tasks/{id}
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTask>,
) -> AppResult<Json<TaskView>> {
    Ok(Json(resolver::update_task(state.store(), id, &input).await?))
}

/// DELETE /api/tasks/{id}
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !state.store.delete_task(id).await? {
        return Err(AppError::Core(CoreError::not_found("Task", id)));
    }
    tracing::info!(task_id = id, user_id = user.user_id, "Task deleted");
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// GET /api/tasks/employee/{employee_id}
pub async fn list_by_employee(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(employee_id): Path<DbId>,
) -> AppResult<Json<Vec<TaskView>>> {
    let filter = TaskFilter::for_employee(employee_id);
    Ok(Json(resolver::list_tasks(state.store(), &filter).await?))
}

/// GET /api/tasks/customer/{customer_id}
pub async fn list_by_customer(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
) -> AppResult<Json<Vec<TaskView>>> {
    let filter = TaskFilter::for_customer(customer_id);
    Ok(Json(resolver::list_tasks(state.store(), &filter).await?))
}

/// GET /api/tasks/customer-data/{customer_id}
///
/// What a task created now for this customer would inherit. Creates nothing.
pub async fn customer_data(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
) -> AppResult<Json<TaskAssignment>> {
    let assignment =
        resolver::assignment_for_customer(state.store(), customer_id, Utc::now()).await?;
    Ok(Json(assignment))
}

/// GET /api/tasks/overdue
pub async fn overdue(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TaskView>>> {
    let filter = TaskFilter::overdue(Utc::now());
    Ok(Json(resolver::list_tasks(state.store(), &filter).await?))
}

/// GET /api/tasks/stats/summary
pub async fn stats(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<TaskStats>> {
    Ok(Json(resolver::task_stats(state.store(), Utc::now()).await?))
}
