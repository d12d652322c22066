use std::collections::BTreeMap;

use async_trait::async_trait;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::{DbId, Timestamp};
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;

use super::{
    referenced_by_tasks, ContractorStore, CustomerStore, EmployeeStore, Store, TaskStore,
    UserStore,
};
use crate::error::{StoreError, StoreResult};
use crate::models::contractor::{Contractor, CreateContractor, UpdateContractor};
use crate::models::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use crate::models::task::{NewTask, Task, TaskFilter, UpdateTask};
use crate::models::user::{CreateUser, User};

/// Rows keyed by id, with a BIGSERIAL-style sequence.
#[derive(Debug)]
struct Table<T> {
    next_id: DbId,
    rows: BTreeMap<DbId, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(DbId) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: DbId) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn get_many(&self, ids: &[DbId]) -> Vec<T> {
        ids.iter().filter_map(|id| self.rows.get(id).cloned()).collect()
    }
}

#[derive(Debug, Default)]
struct Tables {
    contractors: Table<Contractor>,
    employees: Table<Employee>,
    customers: Table<Customer>,
    tasks: Table<Task>,
    users: Table<User>,
}

impl Tables {
    fn task_count(&self, matches: impl Fn(&Task) -> bool) -> i64 {
        self.tasks.rows.values().filter(|t| matches(t)).count() as i64
    }
}

/// Newest first, id descending on ties.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (Timestamp, DbId)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Non-persistent [`Store`] for demos and tests.
///
/// All tables sit behind one lock so cross-table rules (contractor detach,
/// restricted deletes, reference checks on insert) apply atomically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractorStore for MemoryStore {
    async fn create_contractor(&self, input: &CreateContractor) -> StoreResult<Contractor> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        Ok(tables.contractors.insert_with(|id| Contractor {
            id,
            name: input.name.clone(),
            status: input.status.unwrap_or_default(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn find_contractor(&self, id: DbId) -> StoreResult<Option<Contractor>> {
        Ok(self.tables.read().await.contractors.get(id))
    }

    async fn find_contractors(&self, ids: &[DbId]) -> StoreResult<Vec<Contractor>> {
        Ok(self.tables.read().await.contractors.get_many(ids))
    }

    async fn list_contractors(&self) -> StoreResult<Vec<Contractor>> {
        let mut rows: Vec<_> = self
            .tables
            .read()
            .await
            .contractors
            .rows
            .values()
            .cloned()
            .collect();
        newest_first(&mut rows, |c| (c.created_at, c.id));
        Ok(rows)
    }

    async fn update_contractor(
        &self,
        id: DbId,
        input: &UpdateContractor,
    ) -> StoreResult<Option<Contractor>> {
        let mut tables = self.tables.write().await;
        let Some(contractor) = tables.contractors.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            contractor.name = name.clone();
        }
        if let Some(status) = input.status {
            contractor.status = status;
        }
        if let Some(phone) = &input.phone {
            contractor.phone = Some(phone.clone());
        }
        if let Some(email) = &input.email {
            contractor.email = Some(email.clone());
        }
        contractor.updated_at = Utc::now();
        Ok(Some(contractor.clone()))
    }

    async fn delete_contractor(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.contractors.rows.remove(&id).is_none() {
            return Ok(false);
        }
        let now = Utc::now();
        for customer in tables.customers.rows.values_mut() {
            if customer.contractor_id == Some(id) {
                customer.contractor_id = None;
                customer.updated_at = now;
            }
        }
        for task in tables.tasks.rows.values_mut() {
            if task.contractor_id == Some(id) {
                task.contractor_id = None;
                task.updated_at = now;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn create_employee(&self, input: &CreateEmployee) -> StoreResult<Employee> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        Ok(tables.employees.insert_with(|id| Employee {
            id,
            name: input.name.clone(),
            status: input.status.unwrap_or_default(),
            email: input.email.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn find_employee(&self, id: DbId) -> StoreResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(id))
    }

    async fn find_employees(&self, ids: &[DbId]) -> StoreResult<Vec<Employee>> {
        Ok(self.tables.read().await.employees.get_many(ids))
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let mut rows: Vec<_> = self
            .tables
            .read()
            .await
            .employees
            .rows
            .values()
            .cloned()
            .collect();
        newest_first(&mut rows, |e| (e.created_at, e.id));
        Ok(rows)
    }

    async fn update_employee(
        &self,
        id: DbId,
        input: &UpdateEmployee,
    ) -> StoreResult<Option<Employee>> {
        let mut tables = self.tables.write().await;
        let Some(employee) = tables.employees.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            employee.name = name.clone();
        }
        if let Some(status) = input.status {
            employee.status = status;
        }
        if let Some(email) = &input.email {
            employee.email = Some(email.clone());
        }
        employee.updated_at = Utc::now();
        Ok(Some(employee.clone()))
    }

    async fn delete_employee(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.employees.rows.contains_key(&id) {
            return Ok(false);
        }
        let count = tables.task_count(|t| t.employee_id == id);
        if count > 0 {
            return Err(CoreError::Conflict(referenced_by_tasks("Employee", count)).into());
        }
        tables.employees.rows.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn create_customer(&self, input: &NewCustomer) -> StoreResult<Customer> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        if let Some(contractor_id) = input.contractor_id {
            if !tables.contractors.rows.contains_key(&contractor_id) {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: "customers_contractor_id_fkey".into(),
                });
            }
        }
        Ok(tables.customers.insert_with(|id| {
            let mut customer = Customer {
                id,
                customer_name: input.customer_name.clone(),
                contractor_id: input.contractor_id,
                phone_number: input.phone_number.clone(),
                due_days: None,
                today_date: now,
                due_date: None,
                amount: 0.0,
                advance: 0.0,
                part01: 0.0,
                part02: 0.0,
                balance: 0.0,
                services: Json(input.services.clone()),
                architectural_drawing: Json(input.architectural_drawing.clone()),
                notes: input.notes.clone(),
                status: input.status,
                created_at: now,
                updated_at: now,
            };
            customer.set_ledger(input.ledger);
            customer
        }))
    }

    async fn find_customer(&self, id: DbId) -> StoreResult<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(id))
    }

    async fn find_customers(&self, ids: &[DbId]) -> StoreResult<Vec<Customer>> {
        Ok(self.tables.read().await.customers.get_many(ids))
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let mut rows: Vec<_> = self
            .tables
            .read()
            .await
            .customers
            .rows
            .values()
            .cloned()
            .collect();
        newest_first(&mut rows, |c| (c.created_at, c.id));
        Ok(rows)
    }

    async fn update_customer(
        &self,
        id: DbId,
        input: UpdateCustomer,
    ) -> StoreResult<Option<Customer>> {
        let mut tables = self.tables.write().await;
        if let Some(contractor_id) = input.attached_contractor() {
            if !tables.contractors.rows.contains_key(&contractor_id) {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: "customers_contractor_id_fkey".into(),
                });
            }
        }
        let Some(customer) = tables.customers.rows.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        customer.apply_update(input, now);
        customer.updated_at = now;
        Ok(Some(customer.clone()))
    }

    async fn delete_customer(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.customers.rows.contains_key(&id) {
            return Ok(false);
        }
        let count = tables.task_count(|t| t.customer_id == id);
        if count > 0 {
            return Err(CoreError::Conflict(referenced_by_tasks("Customer", count)).into());
        }
        tables.customers.rows.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, input: &NewTask) -> StoreResult<Task> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        if !tables.customers.rows.contains_key(&input.customer_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "fk_tasks_customer".into(),
            });
        }
        if !tables.employees.rows.contains_key(&input.employee_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "fk_tasks_employee".into(),
            });
        }
        if let Some(contractor_id) = input.contractor_id {
            if !tables.contractors.rows.contains_key(&contractor_id) {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: "tasks_contractor_id_fkey".into(),
                });
            }
        }
        Ok(tables.tasks.insert_with(|id| Task {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            customer_id: input.customer_id,
            employee_id: input.employee_id,
            contractor_id: input.contractor_id,
            due_date: input.due_date,
            priority: input.priority,
            status: input.status,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn find_task(&self, id: DbId) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(id))
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let mut rows: Vec<_> = self
            .tables
            .read()
            .await
            .tasks
            .rows
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        newest_first(&mut rows, |t| (t.created_at, t.id));
        Ok(rows)
    }

    async fn update_task(&self, id: DbId, input: &UpdateTask) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        if let Some(employee_id) = input.employee_id {
            if !tables.employees.rows.contains_key(&employee_id) {
                return Err(StoreError::ForeignKeyViolation {
                    constraint: "fk_tasks_employee".into(),
                });
            }
        }
        let Some(task) = tables.tasks.rows.get_mut(&id) else {
            return Ok(None);
        };
        input.apply_to(task);
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables.write().await.tasks.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        if tables
            .users
            .rows
            .values()
            .any(|u| u.username == input.username)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_users_username".into(),
            });
        }
        Ok(tables.users.insert_with(|id| User {
            id,
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
