//! Customer due-date and balance derivation.
//!
//! A customer's `due_date` and `balance` are never taken from the client.
//! They are derived from two independent groups of inputs:
//!
//! - the *schedule*: `today_date` and `due_days`
//!   (`due_date = today_date + due_days` whole days),
//! - the *payments*: `amount`, `advance`, `part01`, `part02`
//!   (`balance = amount - advance - part01 - part02`).
//!
//! The same [`Ledger`] routine runs on create, on partial updates and for
//! unsaved previews, so the write path and any client-side preview cannot
//! drift apart. A group is only re-derived when the payload touches one of
//! its fields.

use chrono::Duration;
use serde::Serialize;

use crate::types::Timestamp;

/// Upper bound accepted for `due_days` by request validation (100 years).
pub const MAX_DUE_DAYS: i32 = 36_500;

/// `today + due_days` calendar days, applied to the stored instant.
///
/// Returns `None` if the result falls outside the representable range.
pub fn due_date(today: Timestamp, due_days: i32) -> Option<Timestamp> {
    today.checked_add_signed(Duration::days(i64::from(due_days)))
}

/// Outstanding balance. Negative results are allowed (overpayment).
pub fn balance(amount: f64, advance: f64, part01: f64, part02: f64) -> f64 {
    amount - advance - part01 - part02
}

/// Due date a new task inherits from its customer.
///
/// The customer's stored due date wins; otherwise `now + due_days` when the
/// customer has `due_days`; otherwise there is no due date.
pub fn task_due_date(
    stored_due_date: Option<Timestamp>,
    due_days: Option<i32>,
    now: Timestamp,
) -> Option<Timestamp> {
    stored_due_date.or_else(|| due_days.and_then(|days| due_date(now, days)))
}

/// Which input groups a payload touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivationScope {
    pub schedule: bool,
    pub payments: bool,
}

impl DerivationScope {
    pub const ALL: Self = Self {
        schedule: true,
        payments: true,
    };

    pub fn is_empty(self) -> bool {
        !self.schedule && !self.payments
    }
}

/// Ledger-relevant fields of a create or update payload. `None` means
/// "not present in the payload".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerInput {
    pub today_date: Option<Timestamp>,
    pub due_days: Option<i32>,
    /// Explicit due date; only honored while no `due_days` applies.
    pub due_date: Option<Timestamp>,
    pub amount: Option<f64>,
    pub advance: Option<f64>,
    pub part01: Option<f64>,
    pub part02: Option<f64>,
}

impl LedgerInput {
    pub fn scope(&self) -> DerivationScope {
        DerivationScope {
            schedule: self.today_date.is_some() || self.due_days.is_some(),
            payments: self.amount.is_some()
                || self.advance.is_some()
                || self.part01.is_some()
                || self.part02.is_some(),
        }
    }
}

/// The derived state of a customer record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub today_date: Timestamp,
    pub due_days: Option<i32>,
    pub due_date: Option<Timestamp>,
    pub amount: f64,
    pub advance: f64,
    pub part01: f64,
    pub part02: f64,
    pub balance: f64,
}

impl Ledger {
    /// Build the ledger for a new record. A missing `today_date` defaults to
    /// `now` and missing money fields to zero; both groups are derived.
    pub fn from_input(input: &LedgerInput, now: Timestamp) -> Self {
        let mut ledger = Self {
            today_date: input.today_date.unwrap_or(now),
            due_days: input.due_days,
            due_date: input.due_date,
            amount: input.amount.unwrap_or(0.0),
            advance: input.advance.unwrap_or(0.0),
            part01: input.part01.unwrap_or(0.0),
            part02: input.part02.unwrap_or(0.0),
            balance: 0.0,
        };
        ledger.derive(DerivationScope::ALL);
        ledger
    }

    /// Merge a partial update into the ledger and re-derive the groups it
    /// touched. Returns the scope that was re-derived.
    ///
    /// A payload that touches the schedule without a `today_date` restarts
    /// the schedule at `now`, as on create.
    pub fn apply(&mut self, input: &LedgerInput, now: Timestamp) -> DerivationScope {
        let scope = input.scope();
        if scope.schedule {
            self.today_date = input.today_date.unwrap_or(now);
        }
        if let Some(days) = input.due_days {
            self.due_days = Some(days);
        }
        if let Some(explicit) = input.due_date {
            if self.due_days.is_none() {
                self.due_date = Some(explicit);
            }
        }
        if let Some(amount) = input.amount {
            self.amount = amount;
        }
        if let Some(advance) = input.advance {
            self.advance = advance;
        }
        if let Some(part01) = input.part01 {
            self.part01 = part01;
        }
        if let Some(part02) = input.part02 {
            self.part02 = part02;
        }

        self.derive(scope);
        scope
    }

    /// Recompute the derived fields for the given scope.
    pub fn derive(&mut self, scope: DerivationScope) {
        if scope.schedule {
            if let Some(days) = self.due_days {
                if let Some(due) = due_date(self.today_date, days) {
                    self.due_date = Some(due);
                }
            }
        }
        if scope.payments {
            self.balance = balance(self.amount, self.advance, self.part01, self.part02);
        }
    }
}
