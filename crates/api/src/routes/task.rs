//! Route definitions for the `/tasks` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /overdue                       -> overdue
/// GET    /stats/summary                 -> stats
/// GET    /employee/{employee_id}        -> list_by_employee
/// GET    /customer/{customer_id}        -> list_by_customer
/// GET    /customer-data/{customer_id}   -> customer_data
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list).post(task::create))
        .route("/overdue", get(task::overdue))
        .route("/stats/summary", get(task::stats))
        .route("/employee/{employee_id}", get(task::list_by_employee))
        .route("/customer/{customer_id}", get(task::list_by_customer))
        .route("/customer-data/{customer_id}", get(task::customer_data))
        .route(
            "/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
}
