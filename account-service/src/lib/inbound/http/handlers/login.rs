use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::register::SessionResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::PlainPassword;
use crate::inbound::http::extract::Validate;
use crate::inbound::http::extract::ValidatedJson;
use crate::inbound::http::extract::Violations;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(command): ValidatedJson<LoginRequest>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    state
        .auth_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|ref authenticated| ApiSuccess::new(StatusCode::OK, authenticated.into()))
}

/// HTTP request body for logging in (raw JSON)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

impl Validate for LoginRequest {
    type Output = LoginCommand;

    fn validate(self) -> Result<LoginCommand, Vec<String>> {
        let mut violations = Violations::new();

        let email = violations
            .required("email", self.email)
            .and_then(|v| violations.check(EmailAddress::new(v)));
        let password = violations
            .required("password", self.password)
            .and_then(|v| violations.check(PlainPassword::new("password", v)));

        match (email, password) {
            (Some(email), Some(password)) => Ok(LoginCommand {
                email: email.as_str().to_string(),
                password,
            }),
            _ => Err(violations.into_inner()),
        }
    }
}
