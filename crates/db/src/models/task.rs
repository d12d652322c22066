//! Task entity model, DTOs, filters and summary statistics.

use bizdesk_core::types::{flexible_timestamp, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::contractor::ContractorSummary;
use crate::models::customer::CustomerSummary;
use crate::models::employee::EmployeeSummary;
use crate::models::status::{TaskPriority, TaskStatus};

/// A row from the `tasks` table.
///
/// `contractor_id` and `due_date` are snapshots taken from the customer when
/// the task was created. Reference columns are not serialized directly; see
/// [`TaskView`].
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub customer_id: DbId,
    #[serde(skip_serializing)]
    pub employee_id: DbId,
    #[serde(skip_serializing)]
    pub contractor_id: Option<DbId>,
    pub due_date: Timestamp,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Open and past its due date.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        !self.status.is_closed() && self.due_date < now
    }
}

/// A task with its references expanded into summaries. A reference whose
/// target no longer exists is `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    #[serde(rename = "customerId")]
    pub customer: Option<CustomerSummary>,
    #[serde(rename = "employeeId")]
    pub employee: Option<EmployeeSummary>,
    #[serde(rename = "contractorId")]
    pub contractor: Option<ContractorSummary>,
}

/// Request body for task creation.
///
/// The contractor and due date are never taken from the client; they are
/// resolved from the customer.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(required(message = "customerId is required"))]
    pub customer_id: Option<DbId>,
    #[validate(required(message = "employeeId is required"))]
    pub employee_id: Option<DbId>,
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `Medium` if omitted.
    pub priority: Option<TaskPriority>,
    pub notes: Option<String>,
}

/// A resolved task ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub customer_id: DbId,
    pub employee_id: DbId,
    pub contractor_id: Option<DbId>,
    pub due_date: Timestamp,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub notes: Option<String>,
}

/// DTO for updating an existing task. All fields are optional.
///
/// The customer and the contractor snapshot cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub employee_id: Option<DbId>,
    #[serde(default, deserialize_with = "flexible_timestamp::option")]
    pub due_date: Option<Timestamp>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub notes: Option<String>,
}

impl UpdateTask {
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(employee_id) = self.employee_id {
            task.employee_id = employee_id;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(notes) = &self.notes {
            task.notes = Some(notes.clone());
        }
    }
}

/// Filter for task listings. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub customer_id: Option<DbId>,
    pub employee_id: Option<DbId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
    /// Only open tasks due before this instant.
    pub overdue_at: Option<Timestamp>,
}

impl TaskFilter {
    pub fn for_customer(customer_id: DbId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    pub fn for_employee(employee_id: DbId) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Default::default()
        }
    }

    pub fn overdue(now: Timestamp) -> Self {
        Self {
            overdue_at: Some(now),
            ..Default::default()
        }
    }

    /// `search` trimmed and lowercased, or `None` when blank.
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, task: &Task) -> bool {
        if self.customer_id.is_some_and(|id| task.customer_id != id) {
            return false;
        }
        if self.employee_id.is_some_and(|id| task.employee_id != id) {
            return false;
        }
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }
        if self.overdue_at.is_some_and(|now| !task.is_overdue(now)) {
            return false;
        }
        match self.search_needle() {
            Some(needle) => {
                task.title.to_lowercase().contains(&needle)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Counts returned by `GET /tasks/stats/summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub overdue: usize,
    pub high_priority: usize,
}

impl TaskStats {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>, now: Timestamp) -> Self {
        let mut stats = Self::default();
        for task in tasks {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Cancelled => stats.cancelled += 1,
            }
            if task.is_overdue(now) {
                stats.overdue += 1;
            }
            if task.priority == TaskPriority::High {
                stats.high_priority += 1;
            }
        }
        stats
    }
}
