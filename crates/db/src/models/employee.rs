//! Employee entity model and DTOs.

use bizdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::ActivityStatus;

/// A row from the `employees` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: DbId,
    pub name: String,
    pub status: ActivityStatus,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// `{id, name, status}` projection embedded in task responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub id: DbId,
    pub name: String,
    pub status: ActivityStatus,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            status: employee.status,
        }
    }
}

/// DTO for creating a new employee.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Defaults to `Active` if omitted.
    pub status: Option<ActivityStatus>,
    pub email: Option<String>,
}

/// DTO for updating an existing employee. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub status: Option<ActivityStatus>,
    pub email: Option<String>,
}
