//! Repository for the `customers` table.
//!
//! `due_date` and `balance` are written exactly as derived by the caller;
//! this layer never computes them.

use bizdesk_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::customer::{Customer, NewCustomer};

const COLUMNS: &str = "id, customer_name, contractor_id, phone_number, due_days, today_date, \
     due_date, amount, advance, part01, part02, balance, services, architectural_drawing, \
     notes, status, created_at, updated_at";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a fully derived customer, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (customer_name, contractor_id, phone_number, due_days,
                today_date, due_date, amount, advance, part01, part02, balance,
                services, architectural_drawing, notes, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        let ledger = &input.ledger;
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.customer_name)
            .bind(input.contractor_id)
            .bind(&input.phone_number)
            .bind(ledger.due_days)
            .bind(ledger.today_date)
            .bind(ledger.due_date)
            .bind(ledger.amount)
            .bind(ledger.advance)
            .bind(ledger.part01)
            .bind(ledger.part02)
            .bind(ledger.balance)
            .bind(Json(&input.services))
            .bind(Json(&input.architectural_drawing))
            .bind(&input.notes)
            .bind(input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = ANY($1)");
        sqlx::query_as::<_, Customer>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Customer>(&query).fetch_all(pool).await
    }

    /// Overwrite every mutable column with the values in `customer`.
    ///
    /// Partial updates are merged and re-derived in memory first (see
    /// [`Customer::apply_update`]), so this is a full-row write. Returns
    /// `None` if the row no longer exists.
    pub async fn save(pool: &PgPool, customer: &Customer) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                customer_name = $2,
                contractor_id = $3,
                phone_number = $4,
                due_days = $5,
                today_date = $6,
                due_date = $7,
                amount = $8,
                advance = $9,
                part01 = $10,
                part02 = $11,
                balance = $12,
                services = $13,
                architectural_drawing = $14,
                notes = $15,
                status = $16
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(customer.id)
            .bind(&customer.customer_name)
            .bind(customer.contractor_id)
            .bind(&customer.phone_number)
            .bind(customer.due_days)
            .bind(customer.today_date)
            .bind(customer.due_date)
            .bind(customer.amount)
            .bind(customer.advance)
            .bind(customer.part01)
            .bind(customer.part02)
            .bind(customer.balance)
            .bind(&customer.services)
            .bind(&customer.architectural_drawing)
            .bind(&customer.notes)
            .bind(customer.status)
            .fetch_optional(pool)
            .await
    }

    /// Fails with a foreign-key violation while tasks still reference the
    /// customer.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
