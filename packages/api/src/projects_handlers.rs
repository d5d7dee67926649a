// ABOUTME: HTTP request handlers for project lifecycle operations
// ABOUTME: Create, list, read, update, delete, reset, and generation progress

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use juststart_wizard::{CreateProjectInput, Stage, UpdateProjectInput};

use crate::auth::CurrentIdentity;
use crate::error::ApiResult;
use crate::response::{created, ok};
use crate::state::AppState;

/// List the caller's projects
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<impl IntoResponse> {
    info!("Listing projects");
    let projects = state.projects.list_projects(&identity).await?;
    Ok(ok(projects))
}

/// Create a new project in the draft stage
pub async fn create_project(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(input): Json<CreateProjectInput>,
) -> ApiResult<impl IntoResponse> {
    info!("Creating project: {}", input.app_name);
    let project = state.projects.create_project(&identity, input).await?;
    Ok(created(project))
}

/// Get a project; `data` is null when it is absent or not the caller's
pub async fn get_project(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let project = state.projects.get_project(&identity, &project_id).await?;
    Ok(ok(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
    Json(input): Json<UpdateProjectInput>,
) -> ApiResult<impl IntoResponse> {
    info!("Updating project: {}", project_id);
    let project = state
        .projects
        .update_project(&identity, &project_id, input)
        .await?;
    Ok(ok(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Deleting project: {}", project_id);
    state.projects.delete_project(&identity, &project_id).await?;
    Ok(ok(serde_json::json!({ "message": "Project deleted" })))
}

/// Request body for resetting a project
#[derive(Deserialize)]
pub struct ResetRequest {
    pub stage: i64,
}

/// Go back to an earlier stage, discarding downstream artifacts
pub async fn reset_project(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
    Json(request): Json<ResetRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Resetting project {} to stage {}", project_id, request.stage);
    let stage = Stage::from_reset_target(request.stage)?;
    let project = state
        .projects
        .reset_from_stage(&identity, &project_id, stage)
        .await?;
    Ok(ok(project))
}

/// Progress of a running generation action; `data` is null when idle
pub async fn get_progress(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let progress = state.projects.get_progress(&identity, &project_id).await?;
    Ok(ok(progress))
}
