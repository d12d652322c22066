//! The storage abstraction injected into the HTTP layer.
//!
//! Handlers and the [`crate::resolver`] only ever see `&dyn Store`. Two
//! implementations exist:
//!
//! - [`PgStore`] -- Postgres via the [`crate::repositories`] layer.
//! - [`MemoryStore`] -- non-persistent tables for demos and tests.
//!
//! Both enforce the same reference rules: deleting a contractor detaches it
//! from customers and tasks, while customers and employees cannot be deleted
//! while a task references them.

use async_trait::async_trait;
use bizdesk_core::types::DbId;

use crate::error::StoreResult;
use crate::models::contractor::{Contractor, CreateContractor, UpdateContractor};
use crate::models::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use crate::models::task::{NewTask, Task, TaskFilter, UpdateTask};
use crate::models::user::{CreateUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ContractorStore: Send + Sync {
    async fn create_contractor(&self, input: &CreateContractor) -> StoreResult<Contractor>;
    async fn find_contractor(&self, id: DbId) -> StoreResult<Option<Contractor>>;
    /// Batch lookup; ids with no matching row are skipped.
    async fn find_contractors(&self, ids: &[DbId]) -> StoreResult<Vec<Contractor>>;
    async fn list_contractors(&self) -> StoreResult<Vec<Contractor>>;
    async fn update_contractor(
        &self,
        id: DbId,
        input: &UpdateContractor,
    ) -> StoreResult<Option<Contractor>>;
    /// Returns `false` if nothing was deleted. References are set to null.
    async fn delete_contractor(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn create_employee(&self, input: &CreateEmployee) -> StoreResult<Employee>;
    async fn find_employee(&self, id: DbId) -> StoreResult<Option<Employee>>;
    async fn find_employees(&self, ids: &[DbId]) -> StoreResult<Vec<Employee>>;
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn update_employee(
        &self,
        id: DbId,
        input: &UpdateEmployee,
    ) -> StoreResult<Option<Employee>>;
    /// Fails with `CoreError::Conflict` while tasks reference the employee.
    async fn delete_employee(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn create_customer(&self, input: &NewCustomer) -> StoreResult<Customer>;
    async fn find_customer(&self, id: DbId) -> StoreResult<Option<Customer>>;
    async fn find_customers(&self, ids: &[DbId]) -> StoreResult<Vec<Customer>>;
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;
    /// Merge `input` into the stored record and re-derive the ledger groups
    /// it touches. Returns `None` if the customer does not exist.
    async fn update_customer(
        &self,
        id: DbId,
        input: UpdateCustomer,
    ) -> StoreResult<Option<Customer>>;
    /// Fails with `CoreError::Conflict` while tasks reference the customer.
    async fn delete_customer(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, input: &NewTask) -> StoreResult<Task>;
    async fn find_task(&self, id: DbId) -> StoreResult<Option<Task>>;
    /// Newest first.
    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;
    async fn update_task(&self, id: DbId, input: &UpdateTask) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::UniqueViolation` on `uq_users_username` if
    /// the name is taken.
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}

/// Everything the application needs from its system of record.
#[async_trait]
pub trait Store: ContractorStore + EmployeeStore + CustomerStore + TaskStore + UserStore {
    /// Cheap reachability probe for `/health`.
    async fn health_check(&self) -> StoreResult<()>;
}

/// Message used by both backends when a delete is blocked by tasks.
pub(crate) fn referenced_by_tasks(entity: &str, count: i64) -> String {
    format!("{entity} is referenced by {count} task(s) and cannot be deleted")
}
