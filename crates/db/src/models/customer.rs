//! Customer entity model and DTOs.
//!
//! A customer's `due_date` and `balance` are derived columns: they are
//! computed by [`bizdesk_core::derivation::Ledger`] on every write and any
//! client-supplied `balance` is ignored.

use bizdesk_core::derivation::{DerivationScope, Ledger, LedgerInput, MAX_DUE_DAYS};
use bizdesk_core::types::{flexible_timestamp, nullable, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use crate::models::contractor::ContractorSummary;
use crate::models::status::CustomerStatus;

/// Requested visualisation services. Stored as JSONB, owned by the customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerServices {
    pub exterior_elevation: bool,
    pub exterior_elevation_count: i32,
    pub exterior_dimensions: bool,
    pub interior_walkthrough: bool,
    pub interior_walkthrough_category: Option<String>,
    pub bathroom_design: bool,
    pub show_electrical_point: bool,
    pub interior_render_images: bool,
    pub interior_render_notes: Option<String>,
    pub interior_dimensions: bool,
    pub layout_walkthrough_and_images: bool,
    pub isometric_view: bool,
}

/// Requested architectural drawings. Stored as JSONB, owned by the customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArchitecturalDrawing {
    pub floor_plan: bool,
    pub elevation: bool,
    pub electrical_plan: bool,
    pub furniture_plan: bool,
    pub plumbing_plan: bool,
    pub structural_plan: bool,
    pub notes: Option<String>,
}

/// A row from the `customers` table.
///
/// `contractor_id` is not serialized directly; API responses go through
/// [`CustomerView`], which embeds the contractor summary under the same key.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: DbId,
    pub customer_name: String,
    #[serde(skip_serializing)]
    pub contractor_id: Option<DbId>,
    pub phone_number: Option<String>,
    pub due_days: Option<i32>,
    pub today_date: Timestamp,
    pub due_date: Option<Timestamp>,
    pub amount: f64,
    pub advance: f64,
    pub part01: f64,
    pub part02: f64,
    pub balance: f64,
    pub services: Json<CustomerServices>,
    pub architectural_drawing: Json<ArchitecturalDrawing>,
    pub notes: Option<String>,
    pub status: CustomerStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Customer {
    /// The derivation-relevant slice of this record.
    pub fn ledger(&self) -> Ledger {
        Ledger {
            today_date: self.today_date,
            due_days: self.due_days,
            due_date: self.due_date,
            amount: self.amount,
            advance: self.advance,
            part01: self.part01,
            part02: self.part02,
            balance: self.balance,
        }
    }

    pub fn set_ledger(&mut self, ledger: Ledger) {
        self.today_date = ledger.today_date;
        self.due_days = ledger.due_days;
        self.due_date = ledger.due_date;
        self.amount = ledger.amount;
        self.advance = ledger.advance;
        self.part01 = ledger.part01;
        self.part02 = ledger.part02;
        self.balance = ledger.balance;
    }

    /// Merge a partial update into this record, preserving unspecified
    /// fields, and re-derive the ledger groups the update touched.
    ///
    /// `now` becomes the new `today_date` when the update touches the
    /// schedule without supplying one.
    pub fn apply_update(&mut self, input: UpdateCustomer, now: Timestamp) -> DerivationScope {
        let mut ledger = self.ledger();
        let scope = ledger.apply(&input.ledger_input(), now);
        self.set_ledger(ledger);

        if let Some(name) = input.customer_name {
            self.customer_name = name;
        }
        if let Some(contractor_id) = input.contractor_id {
            self.contractor_id = contractor_id;
        }
        if let Some(phone) = input.phone_number {
            self.phone_number = Some(phone);
        }
        if let Some(services) = input.services {
            self.services = Json(services);
        }
        if let Some(drawing) = input.architectural_drawing {
            self.architectural_drawing = Json(drawing);
        }
        if let Some(notes) = input.notes {
            self.notes = Some(notes);
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        scope
    }
}

/// A customer with its contractor reference expanded to `{id, name, status}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(rename = "contractorId")]
    pub contractor: Option<ContractorSummary>,
}

/// `{id, customerName, phoneNumber}` projection embedded in task responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: DbId,
    pub customer_name: String,
    pub phone_number: Option<String>,
}

impl From<&Customer> for CustomerSummary {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            customer_name: customer.customer_name.clone(),
            phone_number: customer.phone_number.clone(),
        }
    }
}

/// DTO for creating a new customer.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    #[serde(default)]
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,
    pub contractor_id: Option<DbId>,
    pub phone_number: Option<String>,
    #[validate(range(min = 0, max = MAX_DUE_DAYS, message = "dueDays must be between 0 and 36500"))]
    pub due_days: Option<i32>,
    /// Defaults to the time of the request.
    #[serde(default, deserialize_with = "flexible_timestamp::option")]
    pub today_date: Option<Timestamp>,
    /// Only honored when `due_days` is absent.
    #[serde(default, deserialize_with = "flexible_timestamp::option")]
    pub due_date: Option<Timestamp>,
    pub amount: Option<f64>,
    pub advance: Option<f64>,
    pub part01: Option<f64>,
    pub part02: Option<f64>,
    pub services: Option<CustomerServices>,
    pub architectural_drawing: Option<ArchitecturalDrawing>,
    pub notes: Option<String>,
    /// Defaults to `New` if omitted.
    pub status: Option<CustomerStatus>,
}

impl CreateCustomer {
    pub fn ledger_input(&self) -> LedgerInput {
        LedgerInput {
            today_date: self.today_date,
            due_days: self.due_days,
            due_date: self.due_date,
            amount: self.amount,
            advance: self.advance,
            part01: self.part01,
            part02: self.part02,
        }
    }

    /// Derive the ledger and produce the record to insert.
    pub fn into_new(self, now: Timestamp) -> NewCustomer {
        let ledger = Ledger::from_input(&self.ledger_input(), now);
        NewCustomer {
            customer_name: self.customer_name,
            contractor_id: self.contractor_id,
            phone_number: self.phone_number,
            ledger,
            services: self.services.unwrap_or_default(),
            architectural_drawing: self.architectural_drawing.unwrap_or_default(),
            notes: self.notes,
            status: self.status.unwrap_or_default(),
        }
    }
}

/// A fully derived customer ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub customer_name: String,
    pub contractor_id: Option<DbId>,
    pub phone_number: Option<String>,
    pub ledger: Ledger,
    pub services: CustomerServices,
    pub architectural_drawing: ArchitecturalDrawing,
    pub notes: Option<String>,
    pub status: CustomerStatus,
}

/// DTO for updating an existing customer. All fields are optional.
///
/// `contractorId: null` detaches the contractor; omitting it keeps the
/// current one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[validate(length(min = 1, message = "customerName must not be empty"))]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub contractor_id: Option<Option<DbId>>,
    pub phone_number: Option<String>,
    #[validate(range(min = 0, max = MAX_DUE_DAYS, message = "dueDays must be between 0 and 36500"))]
    pub due_days: Option<i32>,
    #[serde(default, deserialize_with = "flexible_timestamp::option")]
    pub today_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "flexible_timestamp::option")]
    pub due_date: Option<Timestamp>,
    pub amount: Option<f64>,
    pub advance: Option<f64>,
    pub part01: Option<f64>,
    pub part02: Option<f64>,
    pub services: Option<CustomerServices>,
    pub architectural_drawing: Option<ArchitecturalDrawing>,
    pub notes: Option<String>,
    pub status: Option<CustomerStatus>,
}

impl UpdateCustomer {
    pub fn ledger_input(&self) -> LedgerInput {
        LedgerInput {
            today_date: self.today_date,
            due_days: self.due_days,
            due_date: self.due_date,
            amount: self.amount,
            advance: self.advance,
            part01: self.part01,
            part02: self.part02,
        }
    }

    /// The contractor this update attaches, if any.
    pub fn attached_contractor(&self) -> Option<DbId> {
        self.contractor_id.flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn stored(new: NewCustomer) -> Customer {
        let now = day(2024, 1, 15);
        let mut customer = Customer {
            id: 1,
            customer_name: new.customer_name,
            contractor_id: new.contractor_id,
            phone_number: new.phone_number,
            due_days: None,
            today_date: now,
            due_date: None,
            amount: 0.0,
            advance: 0.0,
            part01: 0.0,
            part02: 0.0,
            balance: 0.0,
            services: Json(new.services),
            architectural_drawing: Json(new.architectural_drawing),
            notes: new.notes,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        customer.set_ledger(new.ledger);
        customer
    }

    #[test]
    fn create_payload_deserializes_plain_dates_and_ignores_balance() {
        let input: CreateCustomer = serde_json::from_value(serde_json::json!({
            "customerName": "ABC Corporation",
            "contractorId": 1,
            "amount": 5000,
            "advance": 1000,
            "dueDays": 7,
            "todayDate": "2024-01-15",
            "balance": 999999
        }))
        .unwrap();
        assert!(input.validate().is_ok());

        let new = input.into_new(day(2024, 3, 1));
        assert_eq!(new.ledger.balance, 4000.0);
        assert_eq!(new.ledger.due_date, Some(day(2024, 1, 22)));
        assert_eq!(new.status, CustomerStatus::New);
        assert!(!new.services.bathroom_design);
    }

    #[test]
    fn missing_customer_name_fails_validation() {
        let input: CreateCustomer = serde_json::from_value(serde_json::json!({})).unwrap();
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn due_days_is_bounded() {
        let at_limit = CreateCustomer {
            customer_name: "Limit".into(),
            due_days: Some(MAX_DUE_DAYS),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let over = UpdateCustomer {
            due_days: Some(MAX_DUE_DAYS + 1),
            ..Default::default()
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn update_preserves_unspecified_fields() {
        let mut customer = stored(
            CreateCustomer {
                customer_name: "XYZ Industries".into(),
                contractor_id: Some(2),
                phone_number: Some("987-654-3210".into()),
                due_days: Some(10),
                today_date: Some(day(2024, 1, 16)),
                amount: Some(8000.0),
                advance: Some(2000.0),
                ..Default::default()
            }
            .into_new(day(2024, 1, 16)),
        );

        let scope = customer.apply_update(
            UpdateCustomer {
                notes: Some("call back".into()),
                ..Default::default()
            },
            day(2024, 3, 1),
        );

        assert!(scope.is_empty());
        assert_eq!(customer.customer_name, "XYZ Industries");
        assert_eq!(customer.contractor_id, Some(2));
        assert_eq!(customer.due_date, Some(day(2024, 1, 26)));
        assert_eq!(customer.balance, 6000.0);
        assert_eq!(customer.notes.as_deref(), Some("call back"));
    }

    #[test]
    fn update_can_detach_contractor() {
        let mut customer = stored(
            CreateCustomer {
                customer_name: "Detach".into(),
                contractor_id: Some(3),
                ..Default::default()
            }
            .into_new(day(2024, 1, 16)),
        );
        let patch: UpdateCustomer =
            serde_json::from_value(serde_json::json!({ "contractorId": null })).unwrap();
        customer.apply_update(patch, day(2024, 3, 1));
        assert_eq!(customer.contractor_id, None);
    }

    #[test]
    fn update_rederives_touched_groups() {
        let mut customer = stored(
            CreateCustomer {
                customer_name: "Ledger".into(),
                due_days: Some(7),
                today_date: Some(day(2024, 1, 15)),
                amount: Some(5000.0),
                advance: Some(1000.0),
                ..Default::default()
            }
            .into_new(day(2024, 1, 15)),
        );

        let scope = customer.apply_update(
            UpdateCustomer {
                due_days: Some(14),
                part02: Some(500.0),
                ..Default::default()
            },
            day(2024, 2, 1),
        );

        assert_eq!(scope, DerivationScope::ALL);
        assert_eq!(customer.today_date, day(2024, 2, 1));
        assert_eq!(customer.due_date, Some(day(2024, 2, 15)));
        assert_eq!(customer.balance, 3500.0);
    }

    #[test]
    fn view_embeds_contractor_under_contractor_id() {
        let customer = stored(
            CreateCustomer {
                customer_name: "View".into(),
                contractor_id: Some(5),
                ..Default::default()
            }
            .into_new(day(2024, 1, 15)),
        );
        let view = CustomerView {
            customer,
            contractor: Some(ContractorSummary {
                id: 5,
                name: "Smith Construction".into(),
                status: crate::models::status::ActivityStatus::Active,
            }),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["contractorId"]["name"], "Smith Construction");
        assert_eq!(json["customerName"], "View");
        assert_eq!(json["architecturalDrawing"]["floorPlan"], false);
    }
}
