//! Task creation snapshots and read-time reference expansion.

use assert_matches::assert_matches;
use bizdesk_core::error::CoreError;
use bizdesk_db::models::contractor::{CreateContractor, UpdateContractor};
use bizdesk_db::models::customer::{CreateCustomer, UpdateCustomer};
use bizdesk_db::models::employee::CreateEmployee;
use bizdesk_db::models::status::{TaskPriority, TaskStatus};
use bizdesk_db::models::task::{CreateTask, TaskFilter, UpdateTask};
use bizdesk_db::resolver;
use bizdesk_db::store::{ContractorStore, CustomerStore, EmployeeStore, TaskStore};
use bizdesk_db::{MemoryStore, StoreError};
use chrono::{TimeZone, Utc};

fn day(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// One contractor, one employee, and a customer due 2024-01-22.
async fn seeded() -> (MemoryStore, i64, i64, i64) {
    let store = MemoryStore::new();
    let contractor = store
        .create_contractor(&CreateContractor {
            name: "Smith Construction".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let employee = store
        .create_employee(&CreateEmployee {
            name: "John Doe".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let customer = store
        .create_customer(
            &CreateCustomer {
                customer_name: "ABC Corporation".into(),
                contractor_id: Some(contractor.id),
                phone_number: Some("123-456-7890".into()),
                due_days: Some(7),
                today_date: Some(day(2024, 1, 15)),
                amount: Some(5000.0),
                advance: Some(1000.0),
                ..Default::default()
            }
            .into_new(day(2024, 1, 15)),
        )
        .await
        .unwrap();
    (store, contractor.id, employee.id, customer.id)
}

fn task_for(customer_id: i64, employee_id: i64) -> CreateTask {
    CreateTask {
        customer_id: Some(customer_id),
        employee_id: Some(employee_id),
        title: "Prepare floor plan".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn new_task_snapshots_contractor_and_due_date() {
    let (store, contractor_id, employee_id, customer_id) = seeded().await;

    let view = resolver::create_task(&store, task_for(customer_id, employee_id), Utc::now())
        .await
        .unwrap();

    assert_eq!(view.task.contractor_id, Some(contractor_id));
    assert_eq!(view.task.due_date, day(2024, 1, 22));
    assert_eq!(view.task.priority, TaskPriority::Medium);
    assert_eq!(view.task.status, TaskStatus::Pending);
    assert_eq!(
        view.customer.as_ref().map(|c| c.customer_name.as_str()),
        Some("ABC Corporation")
    );
    assert_eq!(view.employee.as_ref().map(|e| e.name.as_str()), Some("John Doe"));
    assert_eq!(
        view.contractor.as_ref().map(|c| c.name.as_str()),
        Some("Smith Construction")
    );
}

#[tokio::test]
async fn later_customer_edits_do_not_reach_existing_tasks() {
    let (store, _, employee_id, customer_id) = seeded().await;
    let other = store
        .create_contractor(&CreateContractor {
            name: "Other".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let view = resolver::create_task(&store, task_for(customer_id, employee_id), Utc::now())
        .await
        .unwrap();

    store
        .update_customer(
            customer_id,
            UpdateCustomer {
                contractor_id: Some(Some(other.id)),
                due_days: Some(30),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reread = resolver::find_task(&store, view.task.id).await.unwrap();
    assert_eq!(reread.task.due_date, day(2024, 1, 22));
    assert_eq!(
        reread.contractor.as_ref().map(|c| c.name.as_str()),
        Some("Smith Construction")
    );
}

#[tokio::test]
async fn unknown_customer_or_employee_is_not_found() {
    let (store, _, employee_id, customer_id) = seeded().await;

    let err = resolver::create_task(&store, task_for(999, employee_id), Utc::now())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        StoreError::Core(CoreError::NotFound {
            entity: "Customer",
            id: 999
        })
    );

    let err = resolver::create_task(&store, task_for(customer_id, 999), Utc::now())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        StoreError::Core(CoreError::NotFound {
            entity: "Employee",
            ..
        })
    );
}

#[tokio::test]
async fn customer_without_schedule_cannot_receive_tasks() {
    let (store, _, employee_id, _) = seeded().await;
    let bare = store
        .create_customer(
            &CreateCustomer {
                customer_name: "No schedule".into(),
                ..Default::default()
            }
            .into_new(Utc::now()),
        )
        .await
        .unwrap();

    let err = resolver::create_task(&store, task_for(bare.id, employee_id), Utc::now())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn dangling_references_expand_to_null() {
    let (store, contractor_id, employee_id, customer_id) = seeded().await;
    let view = resolver::create_task(&store, task_for(customer_id, employee_id), Utc::now())
        .await
        .unwrap();
    store.delete_contractor(contractor_id).await.unwrap();

    let reread = resolver::find_task(&store, view.task.id).await.unwrap();
    assert!(reread.contractor.is_none());
    assert!(reread.customer.is_some());

    let json = serde_json::to_value(&reread).unwrap();
    assert!(json["contractorId"].is_null());
    assert_eq!(json["customerId"]["phoneNumber"], "123-456-7890");
    assert_eq!(json["employeeId"]["status"], "Active");
}

#[tokio::test]
async fn customers_expand_contractor_summary() {
    let (store, contractor_id, _, customer_id) = seeded().await;
    store
        .update_contractor(
            contractor_id,
            &UpdateContractor {
                name: Some("Smith & Sons".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let customers = store.list_customers().await.unwrap();
    let views = resolver::expand_customers(&store, customers).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].customer.id, customer_id);
    assert_eq!(
        views[0].contractor.as_ref().map(|c| c.name.as_str()),
        Some("Smith & Sons")
    );
}

#[tokio::test]
async fn assignment_preview_resolves_due_date() {
    let (store, _, _, customer_id) = seeded().await;
    let assignment = resolver::assignment_for_customer(&store, customer_id, Utc::now())
        .await
        .unwrap();
    assert_eq!(assignment.customer_name, "ABC Corporation");
    assert_eq!(assignment.due_date, Some(day(2024, 1, 22)));
    assert_eq!(assignment.due_days, Some(7));
    assert_eq!(assignment.amount, 5000.0);
    assert!(assignment.contractor.is_some());

    let err = resolver::assignment_for_customer(&store, 404, Utc::now())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn update_task_checks_employee_and_keeps_snapshot() {
    let (store, contractor_id, employee_id, customer_id) = seeded().await;
    let view = resolver::create_task(&store, task_for(customer_id, employee_id), Utc::now())
        .await
        .unwrap();

    let err = resolver::update_task(
        &store,
        view.task.id,
        &UpdateTask {
            employee_id: Some(12345),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));

    let updated = resolver::update_task(
        &store,
        view.task.id,
        &UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.task.status, TaskStatus::Completed);
    assert_eq!(updated.task.contractor_id, Some(contractor_id));
    assert_eq!(updated.task.title, "Prepare floor plan");
}

#[tokio::test]
async fn overdue_and_stats() {
    let (store, _, employee_id, customer_id) = seeded().await;
    // Due 2024-01-22, so overdue for any realistic "now".
    let late = resolver::create_task(&store, task_for(customer_id, employee_id), Utc::now())
        .await
        .unwrap();
    let done = resolver::create_task(
        &store,
        CreateTask {
            priority: Some(TaskPriority::High),
            ..task_for(customer_id, employee_id)
        },
        Utc::now(),
    )
    .await
    .unwrap();
    store
        .update_task(
            done.task.id,
            &UpdateTask {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let now = day(2024, 2, 1);
    let overdue = resolver::list_tasks(&store, &TaskFilter::overdue(now))
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].task.id, late.task.id);

    let stats = resolver::task_stats(&store, now).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.high_priority, 1);

    let not_yet = resolver::list_tasks(&store, &TaskFilter::overdue(day(2024, 1, 1)))
        .await
        .unwrap();
    assert!(not_yet.is_empty());
}
