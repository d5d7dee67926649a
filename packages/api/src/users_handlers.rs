// ABOUTME: HTTP request handlers for the current user
// ABOUTME: Exposes the caller's profile, PRD counter, and subscription balance

use axum::{extract::State, response::IntoResponse};
use tracing::info;

use crate::auth::CurrentIdentity;
use crate::error::{ApiResult, AppError};
use crate::response::ok;
use crate::state::AppState;

/// Get the caller's user record
pub async fn get_current_user(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<impl IntoResponse> {
    info!("Getting current user");

    let user = state
        .users
        .resolve(&identity)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(ok(user))
}
