use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::PlainPassword;
use crate::inbound::http::extract::Validate;
use crate::inbound::http::extract::ValidatedJson;
use crate::inbound::http::extract::Violations;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(command): ValidatedJson<ChangePasswordRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .change_password(&caller.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::message(StatusCode::OK, "Password changed successfully"))
}

/// HTTP request body for changing the password (raw JSON)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    old_password: Option<String>,
    new_password: Option<String>,
    confirm_new_password: Option<String>,
}

impl Validate for ChangePasswordRequest {
    type Output = ChangePasswordCommand;

    fn validate(self) -> Result<ChangePasswordCommand, Vec<String>> {
        let mut violations = Violations::new();

        let old_password = violations
            .required("oldPassword", self.old_password)
            .and_then(|v| violations.check(PlainPassword::new("oldPassword", v)));
        let new_password = violations
            .required("newPassword", self.new_password.clone())
            .and_then(|v| violations.check(PlainPassword::new("newPassword", v)));

        match self.confirm_new_password {
            None => violations.push("confirmNewPassword is required"),
            Some(confirm) if Some(&confirm) != self.new_password.as_ref() => {
                violations.push("Confirm new password must match new password")
            }
            Some(_) => {}
        }

        match (old_password, new_password) {
            (Some(old_password), Some(new_password)) if violations.is_empty() => {
                Ok(ChangePasswordCommand {
                    old_password,
                    new_password,
                })
            }
            _ => Err(violations.into_inner()),
        }
    }
}
