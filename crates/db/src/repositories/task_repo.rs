//! Repository for the `tasks` table.

use bizdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{NewTask, Task, TaskFilter, UpdateTask};

const COLUMNS: &str = "id, title, description, customer_id, employee_id, contractor_id, \
     due_date, priority, status, notes, created_at, updated_at";

/// Provides CRUD operations and filtered listings for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a resolved task, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, customer_id, employee_id, contractor_id,
                due_date, priority, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.customer_id)
            .bind(input.employee_id)
            .bind(input.contractor_id)
            .bind(input.due_date)
            .bind(input.priority)
            .bind(input.status)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks matching every populated field of `filter`.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE ($1::BIGINT IS NULL OR customer_id = $1)
               AND ($2::BIGINT IS NULL OR employee_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)
               AND ($4::TEXT IS NULL OR priority = $4)
               AND ($5::TEXT IS NULL OR title ILIKE $5 OR description ILIKE $5)
               AND ($6::TIMESTAMPTZ IS NULL
                    OR (due_date < $6 AND status NOT IN ('Completed', 'Cancelled')))
             ORDER BY created_at DESC, id DESC"
        );
        let pattern = filter.search_needle().map(|needle| like_pattern(&needle));
        sqlx::query_as::<_, Task>(&query)
            .bind(filter.customer_id)
            .bind(filter.employee_id)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(pattern)
            .bind(filter.overdue_at)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Only non-`None` fields in `input` are applied; the
    /// customer and contractor snapshot are never touched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                employee_id = COALESCE($4, employee_id),
                due_date = COALESCE($5, due_date),
                priority = COALESCE($6, priority),
                status = COALESCE($7, status),
                notes = COALESCE($8, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.employee_id)
            .bind(input.due_date)
            .bind(input.priority)
            .bind(input.status)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_customer(pool: &PgPool, customer_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn count_for_employee(pool: &PgPool, employee_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE employee_id = $1")
            .bind(employee_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
