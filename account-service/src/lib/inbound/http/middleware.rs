use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

/// Request extension carrying the id of the account behind the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedCaller {
    pub user_id: UserId,
}

/// Middleware that validates the bearer access token and adds the caller to
/// request extensions.
///
/// The token must verify and its subject must still exist; anything else is
/// answered with 401 before the handler runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let user_id = state
        .auth_service
        .authenticate(token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    req.extensions_mut().insert(AuthenticatedCaller { user_id });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let no_token =
        || ApiError::Unauthorized("Unauthorized: No token provided".to_string()).into_response();

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(no_token)?;

    let auth_str = auth_header.to_str().map_err(|_| no_token())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(no_token()),
    }
}
