use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::Birthday;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PlainPassword;
use crate::inbound::http::extract::Validate;
use crate::inbound::http::extract::ValidatedJson;
use crate::inbound::http::extract::Violations;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(user): ValidatedJson<RegisterRequest>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    state
        .auth_service
        .register(user)
        .await
        .map_err(ApiError::from)
        .map(|ref authenticated| ApiSuccess::new(StatusCode::CREATED, authenticated.into()))
}

/// HTTP request body for registering an account (raw JSON)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    name: Option<String>,
    surname: Option<String>,
    birthday: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl Validate for RegisterRequest {
    type Output = NewUser;

    fn validate(self) -> Result<NewUser, Vec<String>> {
        let today = Utc::now().date_naive();
        let mut violations = Violations::new();

        let name = violations
            .required("name", self.name)
            .and_then(|v| violations.check(PersonName::new("name", v)));
        let surname = violations
            .required("surname", self.surname)
            .and_then(|v| violations.check(PersonName::new("surname", v)));
        let birthday = violations
            .required("birthday", self.birthday)
            .and_then(|v| violations.check(Birthday::parse(&v, today)));
        let email = violations
            .required("email", self.email)
            .and_then(|v| violations.check(EmailAddress::new(v)));
        let password = violations
            .required("password", self.password.clone())
            .and_then(|v| violations.check(PlainPassword::new("password", v)));

        match self.confirm_password {
            None => violations.push("confirmPassword is required"),
            Some(confirm) if Some(&confirm) != self.password.as_ref() => {
                violations.push("Confirm password must match password")
            }
            Some(_) => {}
        }

        match (name, surname, birthday, email, password) {
            (Some(name), Some(surname), Some(birthday), Some(email), Some(password))
                if violations.is_empty() =>
            {
                Ok(NewUser {
                    name,
                    surname,
                    birthday,
                    email,
                    password,
                })
            }
            _ => Err(violations.into_inner()),
        }
    }
}

/// Account summary plus tokens, returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponseData {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<&AuthenticatedUser> for SessionResponseData {
    fn from(authenticated: &AuthenticatedUser) -> Self {
        let user = &authenticated.user;
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            surname: user.surname.as_str().to_string(),
            email: user.email.as_str().to_string(),
            access_token: authenticated.tokens.access_token.clone(),
            refresh_token: authenticated.tokens.refresh_token.clone(),
        }
    }
}
