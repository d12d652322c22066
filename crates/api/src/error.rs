use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bizdesk_core::error::CoreError;
use bizdesk_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for storage
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bizdesk_core`.
    #[error(transparent)]
    Core(CoreError),

    /// A storage failure that is not a domain rule.
    #[error(transparent)]
    Store(StoreError),

    /// Malformed request body or parameters.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Core(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => AppError::Core(core),
            other => AppError::Store(other),
        }
    }
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            // --- Storage errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a storage error into an HTTP status, error code, and message.
///
/// - Unique violations map to 400 `CONFLICT`.
/// - Foreign-key violations (a reference is missing or still in use) map to
///   400 `CONFLICT`.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::UniqueViolation { constraint } if constraint == "uq_users_username" => (
            StatusCode::BAD_REQUEST,
            "CONFLICT",
            "Username already exists".to_string(),
        ),
        StoreError::UniqueViolation { constraint } => (
            StatusCode::BAD_REQUEST,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        StoreError::ForeignKeyViolation { constraint } => (
            StatusCode::BAD_REQUEST,
            "CONFLICT",
            format!("Referenced record is missing or still in use: {constraint}"),
        ),
        StoreError::Core(_) | StoreError::Database(_) => {
            tracing::error!(error = %err, "Storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn store_core_errors_are_flattened() {
        let err = AppError::from(StoreError::Core(CoreError::not_found("Task", 3)));
        assert_matches!(err, AppError::Core(CoreError::NotFound { entity: "Task", id: 3 }));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::from(CoreError::not_found("Task", 1)), StatusCode::NOT_FOUND),
            (AppError::from(CoreError::Validation("x".into())), StatusCode::BAD_REQUEST),
            (AppError::from(CoreError::Conflict("x".into())), StatusCode::BAD_REQUEST),
            (AppError::from(CoreError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED),
            (AppError::from(CoreError::Forbidden("x".into())), StatusCode::FORBIDDEN),
            (
                AppError::InternalError("secret detail".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(StoreError::UniqueViolation {
                    constraint: "uq_users_username".into(),
                }),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
