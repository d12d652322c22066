pub mod auth;
pub mod contractor;
pub mod customer;
pub mod employee;
pub mod health;
pub mod task;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/register                       register (public; superadmin role needs a superadmin token)
///
/// /employees                           list, create
/// /employees/{id}                      get, update, delete
///
/// /contractors                         list, create
/// /contractors/{id}                    get, update, delete
///
/// /customers                           list, create
/// /customers/preview                   derive dueDate/balance without saving (POST)
/// /customers/{id}                      get, update, delete
///
/// /tasks                               list (?status=&priority=&search=), create
/// /tasks/overdue                       open tasks past their due date
/// /tasks/stats/summary                 counts by status and priority
/// /tasks/employee/{employee_id}        tasks assigned to an employee
/// /tasks/customer/{customer_id}        tasks for a customer
/// /tasks/customer-data/{customer_id}   customer prefill for a new task
/// /tasks/{id}                          get, update, delete
/// ```
///
/// Everything except `/auth` requires a bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/employees", employee::router())
        .nest("/contractors", contractor::router())
        .nest("/customers", customer::router())
        .nest("/tasks", task::router())
}
