use std::fmt;

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::extract::Request;
use axum::Json;
use serde::de::DeserializeOwned;

use super::handlers::ApiError;

/// Request body that can be checked and turned into a domain value.
///
/// Implementations report every violated rule, not just the first.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, Vec<String>>;
}

/// JSON body extractor that runs [`Validate`] before the handler.
///
/// Malformed JSON is rejected with the extractor's own message; a well-formed
/// body that breaks any rule is rejected with the full list of violations.
pub struct ValidatedJson<T: Validate>(pub T::Output);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest(rejection.body_text()))?;

        body.validate().map(ValidatedJson).map_err(|errors| {
            tracing::debug!(?errors, "Request body rejected");
            ApiError::Validation(errors)
        })
    }
}

/// Accumulates rule violations while a request body is validated.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Record `"{field} is required"` when the value is absent or blank.
    pub fn required(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match value {
            Some(value) if !value.trim().is_empty() => Some(value),
            _ => {
                self.push(format!("{} is required", field));
                None
            }
        }
    }

    /// Keep the value on success, record the error otherwise.
    pub fn check<T, E: fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        result.map_err(|e| self.push(e.to_string())).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}
