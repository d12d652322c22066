//! Request body extraction with validation.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use bizdesk_core::error::CoreError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON body that has been deserialized and passed its `validator` rules.
///
/// Malformed JSON is rejected as 400 `BAD_REQUEST`; rule failures as 400
/// `VALIDATION_ERROR` listing every failed field.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| CoreError::Validation(describe(&errors)))?;
        Ok(ValidatedJson(value))
    }
}

/// Flatten validation errors into one sorted, `; `-separated message.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid ({})", e.code),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use bizdesk_db::models::task::CreateTask;

    use super::*;

    #[test]
    fn describe_lists_every_failed_field() {
        let input = CreateTask::default();
        let errors = input.validate().unwrap_err();
        assert_eq!(
            describe(&errors),
            "customerId is required; employeeId is required; title is required"
        );
    }
}
