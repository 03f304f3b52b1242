use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::Utc;
use serde::Deserialize;

use super::get_user::UserProfileData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::Birthday;
use crate::domain::user::models::EditProfileCommand;
use crate::domain::user::models::PersonName;
use crate::inbound::http::extract::Validate;
use crate::inbound::http::extract::ValidatedJson;
use crate::inbound::http::extract::Violations;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

pub async fn edit_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(command): ValidatedJson<EditUserRequest>,
) -> Result<ApiSuccess<UserProfileData>, ApiError> {
    state
        .auth_service
        .edit_profile(&caller.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// HTTP request body for editing the profile (raw JSON)
///
/// All fields are optional; an absent field is left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditUserRequest {
    name: Option<String>,
    surname: Option<String>,
    birthday: Option<String>,
}

impl Validate for EditUserRequest {
    type Output = EditProfileCommand;

    fn validate(self) -> Result<EditProfileCommand, Vec<String>> {
        let today = Utc::now().date_naive();
        let mut violations = Violations::new();

        let command = EditProfileCommand {
            name: self
                .name
                .and_then(|v| violations.check(PersonName::new("name", v))),
            surname: self
                .surname
                .and_then(|v| violations.check(PersonName::new("surname", v))),
            birthday: self
                .birthday
                .and_then(|v| violations.check(Birthday::parse(&v, today))),
        };

        if violations.is_empty() {
            Ok(command)
        } else {
            Err(violations.into_inner())
        }
    }
}
