//! Reference resolution between contractors, customers and tasks.
//!
//! Writes: a new task snapshots its customer's contractor and due date at
//! creation; later customer edits never reach existing tasks.
//!
//! Reads: stored references are bare ids. The `expand_*` functions batch-load
//! the referenced records once per call and embed `{id, ...}` summaries. A
//! reference whose target is gone expands to `null`.

use std::collections::{BTreeSet, HashMap};

use bizdesk_core::derivation::task_due_date;
use bizdesk_core::error::CoreError;
use bizdesk_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::error::StoreResult;
use crate::models::contractor::ContractorSummary;
use crate::models::customer::{Customer, CustomerSummary, CustomerView};
use crate::models::employee::EmployeeSummary;
use crate::models::status::{CustomerStatus, TaskStatus};
use crate::models::task::{CreateTask, NewTask, Task, TaskFilter, TaskStats, TaskView, UpdateTask};
use crate::store::Store;

/// Customer details a client needs to prefill a task form, with the due date
/// a task created now would inherit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub id: DbId,
    pub customer_name: String,
    pub phone_number: Option<String>,
    pub contractor: Option<ContractorSummary>,
    pub due_date: Option<Timestamp>,
    pub due_days: Option<i32>,
    pub amount: f64,
    pub status: CustomerStatus,
}

fn distinct(ids: impl Iterator<Item = DbId>) -> Vec<DbId> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Fail with `NotFound` unless the contractor exists. `None` passes.
pub async fn ensure_contractor(store: &dyn Store, contractor_id: Option<DbId>) -> StoreResult<()> {
    if let Some(id) = contractor_id {
        if store.find_contractor(id).await?.is_none() {
            return Err(CoreError::not_found("Contractor", id).into());
        }
    }
    Ok(())
}

pub async fn ensure_employee(store: &dyn Store, employee_id: DbId) -> StoreResult<()> {
    if store.find_employee(employee_id).await?.is_none() {
        return Err(CoreError::not_found("Employee", employee_id).into());
    }
    Ok(())
}

/// Expand `contractorId` on each customer, preserving order.
pub async fn expand_customers(
    store: &dyn Store,
    customers: Vec<Customer>,
) -> StoreResult<Vec<CustomerView>> {
    let ids = distinct(customers.iter().filter_map(|c| c.contractor_id));
    let contractors: HashMap<DbId, ContractorSummary> = if ids.is_empty() {
        HashMap::new()
    } else {
        store
            .find_contractors(&ids)
            .await?
            .iter()
            .map(|c| (c.id, ContractorSummary::from(c)))
            .collect()
    };

    Ok(customers
        .into_iter()
        .map(|customer| {
            let contractor = customer
                .contractor_id
                .and_then(|id| contractors.get(&id).cloned());
            CustomerView {
                customer,
                contractor,
            }
        })
        .collect())
}

pub async fn expand_customer(store: &dyn Store, customer: Customer) -> StoreResult<CustomerView> {
    let mut views = expand_customers(store, vec![customer]).await?;
    views
        .pop()
        .ok_or_else(|| CoreError::Internal("customer expansion returned no rows".into()).into())
}

/// Expand the customer, employee and contractor references of each task,
/// preserving order. One batch lookup per referenced entity type.
pub async fn expand_tasks(store: &dyn Store, tasks: Vec<Task>) -> StoreResult<Vec<TaskView>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let customer_ids = distinct(tasks.iter().map(|t| t.customer_id));
    let employee_ids = distinct(tasks.iter().map(|t| t.employee_id));
    let contractor_ids = distinct(tasks.iter().filter_map(|t| t.contractor_id));

    let customers: HashMap<DbId, CustomerSummary> = store
        .find_customers(&customer_ids)
        .await?
        .iter()
        .map(|c| (c.id, CustomerSummary::from(c)))
        .collect();
    let employees: HashMap<DbId, EmployeeSummary> = store
        .find_employees(&employee_ids)
        .await?
        .iter()
        .map(|e| (e.id, EmployeeSummary::from(e)))
        .collect();
    let contractors: HashMap<DbId, ContractorSummary> = if contractor_ids.is_empty() {
        HashMap::new()
    } else {
        store
            .find_contractors(&contractor_ids)
            .await?
            .iter()
            .map(|c| (c.id, ContractorSummary::from(c)))
            .collect()
    };

    Ok(tasks
        .into_iter()
        .map(|task| TaskView {
            customer: customers.get(&task.customer_id).cloned(),
            employee: employees.get(&task.employee_id).cloned(),
            contractor: task.contractor_id.and_then(|id| contractors.get(&id).cloned()),
            task,
        })
        .collect())
}

pub async fn expand_task(store: &dyn Store, task: Task) -> StoreResult<TaskView> {
    let mut views = expand_tasks(store, vec![task]).await?;
    views
        .pop()
        .ok_or_else(|| CoreError::Internal("task expansion returned no rows".into()).into())
}

/// List tasks matching `filter`, newest first, with references expanded.
pub async fn list_tasks(store: &dyn Store, filter: &TaskFilter) -> StoreResult<Vec<TaskView>> {
    let tasks = store.list_tasks(filter).await?;
    expand_tasks(store, tasks).await
}

pub async fn find_task(store: &dyn Store, id: DbId) -> StoreResult<TaskView> {
    let task = store
        .find_task(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    expand_task(store, task).await
}

/// Resolve a task creation request against its customer and persist it.
///
/// 1. The customer must exist.
/// 2. The employee must exist.
/// 3. The customer's current contractor is copied onto the task.
/// 4. The due date comes from the customer's stored due date, or `now +
///    dueDays`; a customer with neither cannot receive tasks.
pub async fn create_task(
    store: &dyn Store,
    input: CreateTask,
    now: Timestamp,
) -> StoreResult<TaskView> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| CoreError::Validation("customerId is required".into()))?;
    let employee_id = input
        .employee_id
        .ok_or_else(|| CoreError::Validation("employeeId is required".into()))?;

    let customer = store
        .find_customer(customer_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Customer", customer_id))?;
    ensure_employee(store, employee_id).await?;

    let due_date = task_due_date(customer.due_date, customer.due_days, now).ok_or_else(|| {
        CoreError::Validation(format!(
            "Customer {customer_id} has no due date or due days; dueDate is required"
        ))
    })?;

    let new_task = NewTask {
        title: input.title,
        description: input.description,
        customer_id,
        employee_id,
        contractor_id: customer.contractor_id,
        due_date,
        priority: input.priority.unwrap_or_default(),
        status: TaskStatus::default(),
        notes: input.notes,
    };
    let task = store.create_task(&new_task).await?;
    tracing::info!(
        task_id = task.id,
        customer_id,
        employee_id,
        contractor_id = ?task.contractor_id,
        due_date = %task.due_date,
        "Task created",
    );
    expand_task(store, task).await
}

/// Apply a partial task update. A new `employeeId` must exist.
pub async fn update_task(store: &dyn Store, id: DbId, input: &UpdateTask) -> StoreResult<TaskView> {
    if let Some(employee_id) = input.employee_id {
        ensure_employee(store, employee_id).await?;
    }
    let task = store
        .update_task(id, input)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    expand_task(store, task).await
}

/// Preview of what a task created now for this customer would inherit.
pub async fn assignment_for_customer(
    store: &dyn Store,
    customer_id: DbId,
    now: Timestamp,
) -> StoreResult<TaskAssignment> {
    let customer = store
        .find_customer(customer_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Customer", customer_id))?;
    let contractor = match customer.contractor_id {
        Some(id) => store
            .find_contractor(id)
            .await?
            .as_ref()
            .map(ContractorSummary::from),
        None => None,
    };
    Ok(TaskAssignment {
        id: customer.id,
        due_date: task_due_date(customer.due_date, customer.due_days, now),
        customer_name: customer.customer_name,
        phone_number: customer.phone_number,
        contractor,
        due_days: customer.due_days,
        amount: customer.amount,
        status: customer.status,
    })
}

pub async fn task_stats(store: &dyn Store, now: Timestamp) -> StoreResult<TaskStats> {
    let tasks = store.list_tasks(&TaskFilter::default()).await?;
    Ok(TaskStats::tally(&tasks, now))
}
