use async_trait::async_trait;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::DbId;
use chrono::Utc;

use super::{
    referenced_by_tasks, ContractorStore, CustomerStore, EmployeeStore, Store, TaskStore,
    UserStore,
};
use crate::error::StoreResult;
use crate::models::contractor::{Contractor, CreateContractor, UpdateContractor};
use crate::models::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use crate::models::task::{NewTask, Task, TaskFilter, UpdateTask};
use crate::models::user::{CreateUser, User};
use crate::repositories::{ContractorRepo, CustomerRepo, EmployeeRepo, TaskRepo, UserRepo};
use crate::DbPool;

/// [`Store`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ContractorStore for PgStore {
    async fn create_contractor(&self, input: &CreateContractor) -> StoreResult<Contractor> {
        Ok(ContractorRepo::create(&self.pool, input).await?)
    }

    async fn find_contractor(&self, id: DbId) -> StoreResult<Option<Contractor>> {
        Ok(ContractorRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_contractors(&self, ids: &[DbId]) -> StoreResult<Vec<Contractor>> {
        Ok(ContractorRepo::find_by_ids(&self.pool, ids).await?)
    }

    async fn list_contractors(&self) -> StoreResult<Vec<Contractor>> {
        Ok(ContractorRepo::list(&self.pool).await?)
    }

    async fn update_contractor(
        &self,
        id: DbId,
        input: &UpdateContractor,
    ) -> StoreResult<Option<Contractor>> {
        Ok(ContractorRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_contractor(&self, id: DbId) -> StoreResult<bool> {
        Ok(ContractorRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl EmployeeStore for PgStore {
    async fn create_employee(&self, input: &CreateEmployee) -> StoreResult<Employee> {
        Ok(EmployeeRepo::create(&self.pool, input).await?)
    }

    async fn find_employee(&self, id: DbId) -> StoreResult<Option<Employee>> {
        Ok(EmployeeRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_employees(&self, ids: &[DbId]) -> StoreResult<Vec<Employee>> {
        Ok(EmployeeRepo::find_by_ids(&self.pool, ids).await?)
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(EmployeeRepo::list(&self.pool).await?)
    }

    async fn update_employee(
        &self,
        id: DbId,
        input: &UpdateEmployee,
    ) -> StoreResult<Option<Employee>> {
        Ok(EmployeeRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_employee(&self, id: DbId) -> StoreResult<bool> {
        let count = TaskRepo::count_for_employee(&self.pool, id).await?;
        if count > 0 {
            return Err(CoreError::Conflict(referenced_by_tasks("Employee", count)).into());
        }
        // The RESTRICT foreign key still guards against a task inserted in between.
        Ok(EmployeeRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn create_customer(&self, input: &NewCustomer) -> StoreResult<Customer> {
        Ok(CustomerRepo::create(&self.pool, input).await?)
    }

    async fn find_customer(&self, id: DbId) -> StoreResult<Option<Customer>> {
        Ok(CustomerRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_customers(&self, ids: &[DbId]) -> StoreResult<Vec<Customer>> {
        Ok(CustomerRepo::find_by_ids(&self.pool, ids).await?)
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(CustomerRepo::list(&self.pool).await?)
    }

    async fn update_customer(
        &self,
        id: DbId,
        input: UpdateCustomer,
    ) -> StoreResult<Option<Customer>> {
        let Some(mut customer) = CustomerRepo::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        let scope = customer.apply_update(input, Utc::now());
        tracing::debug!(
            customer_id = id,
            schedule = scope.schedule,
            payments = scope.payments,
            "Re-derived customer ledger",
        );
        Ok(CustomerRepo::save(&self.pool, &customer).await?)
    }

    async fn delete_customer(&self, id: DbId) -> StoreResult<bool> {
        let count = TaskRepo::count_for_customer(&self.pool, id).await?;
        if count > 0 {
            return Err(CoreError::Conflict(referenced_by_tasks("Customer", count)).into());
        }
        Ok(CustomerRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, input: &NewTask) -> StoreResult<Task> {
        Ok(TaskRepo::create(&self.pool, input).await?)
    }

    async fn find_task(&self, id: DbId) -> StoreResult<Option<Task>> {
        Ok(TaskRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(TaskRepo::list(&self.pool, filter).await?)
    }

    async fn update_task(&self, id: DbId, input: &UpdateTask) -> StoreResult<Option<Task>> {
        Ok(TaskRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_task(&self, id: DbId) -> StoreResult<bool> {
        Ok(TaskRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
