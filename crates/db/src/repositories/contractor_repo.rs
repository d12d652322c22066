//! Repository for the `contractors` table.

use bizdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::contractor::{Contractor, CreateContractor, UpdateContractor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, status, phone, email, created_at, updated_at";

/// Provides CRUD operations for contractors.
pub struct ContractorRepo;

impl ContractorRepo {
    /// Insert a new contractor, returning the created row.
    ///
    /// If `status` is `None` in the input, the column default (`Active`) applies.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContractor,
    ) -> Result<Contractor, sqlx::Error> {
        let query = format!(
            "INSERT INTO contractors (name, status, phone, email)
             VALUES ($1, COALESCE($2, 'Active'), $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contractor>(&query)
            .bind(&input.name)
            .bind(input.status)
            .bind(&input.phone)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contractor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contractors WHERE id = $1");
        sqlx::query_as::<_, Contractor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Batch lookup used by reference expansion. Missing ids are skipped.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Contractor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contractors WHERE id = ANY($1)");
        sqlx::query_as::<_, Contractor>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Contractor>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM contractors ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Contractor>(&query).fetch_all(pool).await
    }

    /// Update a contractor. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContractor,
    ) -> Result<Option<Contractor>, sqlx::Error> {
        let query = format!(
            "UPDATE contractors SET
                name = COALESCE($2, name),
                status = COALESCE($3, status),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contractor>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.status)
            .bind(&input.phone)
            .bind(&input.email)
            .fetch_optional(pool)
            .await
    }

    /// Delete a contractor. Customers and tasks referencing it are detached
    /// by the `ON DELETE SET NULL` foreign keys.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contractors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
