// ABOUTME: HTTP request handlers for PRD share links
// ABOUTME: Owners create and revoke links; anyone holding a live token can read the PRD

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use crate::auth::CurrentIdentity;
use crate::error::ApiResult;
use crate::response::{created, ok};
use crate::state::AppState;

pub async fn create_share_link(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Creating share link for project: {}", project_id);
    let link = state.shares.create_share_link(&identity, &project_id).await?;
    Ok(created(link))
}

pub async fn revoke_share_link(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Revoking share link for project: {}", project_id);
    state.shares.revoke_share_link(&identity, &project_id).await?;
    Ok(ok(serde_json::json!({ "message": "Share link revoked" })))
}

/// Public read of a shared PRD; `data` is null for unknown or expired tokens
pub async fn get_shared_prd(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let shared = state.shares.get_shared_prd(&token).await?;
    Ok(ok(shared))
}
