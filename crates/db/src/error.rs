//! Storage-layer error type.

use bizdesk_core::error::CoreError;

/// Errors surfaced by a [`crate::store::Store`] implementation.
///
/// Postgres constraint violations are classified by SQLSTATE so the HTTP
/// layer can map them without knowing about sqlx.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLSTATE `23505`.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// SQLSTATE `23503`. Raised when a row is still referenced, or when a
    /// write points at a row that no longer exists.
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// A domain rule enforced by the store itself (missing record,
    /// restricted delete).
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::UniqueViolation { constraint },
                Some("23503") => return StoreError::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    /// True for a duplicate-key failure on the given constraint.
    pub fn is_unique_violation_of(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }
}
