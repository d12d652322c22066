//! Domain error taxonomy shared by the storage and HTTP layers.

use crate::types::DbId;

/// Errors raised by domain rules, independent of transport or storage.
///
/// The HTTP layer maps each variant onto a status code; see
/// `bizdesk_api::error::AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced record does not exist.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A required field is missing or a value is out of range.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The write would break uniqueness or a reference that is still in use.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad credentials, or a missing/invalid bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}
