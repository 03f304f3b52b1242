use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedCaller;
use crate::inbound::http::router::AppState;

pub async fn remove_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .remove_account(&caller.user_id)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::message(StatusCode::OK, "Account removed successfully"))
}
