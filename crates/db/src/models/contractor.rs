//! Contractor entity model and DTOs.

use bizdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::ActivityStatus;

/// A row from the `contractors` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: DbId,
    pub name: String,
    pub status: ActivityStatus,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The `{id, name, status}` projection embedded wherever a contractor is
/// referenced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractorSummary {
    pub id: DbId,
    pub name: String,
    pub status: ActivityStatus,
}

impl From<&Contractor> for ContractorSummary {
    fn from(contractor: &Contractor) -> Self {
        Self {
            id: contractor.id,
            name: contractor.name.clone(),
            status: contractor.status,
        }
    }
}

/// DTO for creating a new contractor.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractor {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Defaults to `Active` if omitted.
    pub status: Option<ActivityStatus>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// DTO for updating an existing contractor. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractor {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub status: Option<ActivityStatus>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
