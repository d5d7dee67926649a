// ABOUTME: HTTP request handlers for the wizard stages
// ABOUTME: Questions, tech stack, compatibility, and PRD reads, generation, and user decisions

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use juststart_wizard::{Answers, StackSelection};

use crate::auth::CurrentIdentity;
use crate::error::ApiResult;
use crate::response::ok;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

pub async fn get_questions(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let questions = state.projects.get_questions(&identity, &project_id).await?;
    Ok(ok(questions))
}

pub async fn generate_questions(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Generating questions for project: {}", project_id);
    let questions = state
        .generation
        .generate_questions(&identity, &project_id)
        .await?;
    Ok(ok(questions))
}

/// Request body for submitting answers
#[derive(Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: Answers,
}

pub async fn submit_answers(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
    Json(request): Json<SubmitAnswersRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Submitting {} answers for project: {}", request.answers.len(), project_id);
    let questions = state
        .projects
        .submit_answers(&identity, &project_id, request.answers)
        .await?;
    Ok(ok(questions))
}

// ---------------------------------------------------------------------------
// Tech stack
// ---------------------------------------------------------------------------

pub async fn get_tech_stack(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let stack = state.projects.get_tech_stack(&identity, &project_id).await?;
    Ok(ok(stack))
}

pub async fn research_tech_stack(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Researching tech stack for project: {}", project_id);
    let stack = state
        .generation
        .research_tech_stack(&identity, &project_id)
        .await?;
    Ok(ok(stack))
}

/// Request body for confirming the stack
#[derive(Deserialize)]
pub struct ConfirmStackRequest {
    #[serde(rename = "confirmedStack")]
    pub confirmed_stack: StackSelection,
}

pub async fn confirm_tech_stack(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
    Json(request): Json<ConfirmStackRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Confirming tech stack for project: {}", project_id);
    let stack = state
        .projects
        .confirm_tech_stack(&identity, &project_id, request.confirmed_stack)
        .await?;
    Ok(ok(stack))
}

// ---------------------------------------------------------------------------
// Compatibility
// ---------------------------------------------------------------------------

pub async fn get_compatibility(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let check = state.projects.get_compatibility(&identity, &project_id).await?;
    Ok(ok(check))
}

pub async fn validate_compatibility(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Validating compatibility for project: {}", project_id);
    let check = state
        .generation
        .validate_compatibility(&identity, &project_id)
        .await?;
    Ok(ok(check))
}

pub async fn acknowledge_compatibility(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Acknowledging compatibility warnings for project: {}", project_id);
    let check = state
        .projects
        .acknowledge_compatibility(&identity, &project_id)
        .await?;
    Ok(ok(check))
}

// ---------------------------------------------------------------------------
// PRD
// ---------------------------------------------------------------------------

pub async fn get_prd(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let prd = state.projects.get_prd(&identity, &project_id).await?;
    Ok(ok(prd))
}

pub async fn generate_prd(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Generating PRD for project: {}", project_id);
    let prd = state.generation.generate_prd(&identity, &project_id).await?;
    Ok(ok(prd))
}

pub async fn export_prd(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Exporting PRD for project: {}", project_id);
    let exported = state.exporter.export_prd(&identity, &project_id).await?;
    Ok(ok(exported))
}
