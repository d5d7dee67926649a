// ABOUTME: HTTP API layer for Just Start providing REST endpoints and routing
// ABOUTME: Integration layer over the wizard services, user storage, and webhook verification

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod health;
pub mod projects_handlers;
pub mod response;
pub mod share_handlers;
pub mod state;
pub mod users_handlers;
pub mod webhook_handlers;
pub mod wizard_handlers;

pub use auth::{CurrentIdentity, IDENTITY_HEADER};
pub use error::{ApiResult, AppError};
pub use state::{ApiSettings, AppState};

/// Creates the per-project router (nested under /api/projects)
fn create_projects_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects_handlers::list_projects).post(projects_handlers::create_project),
        )
        .route(
            "/{id}",
            get(projects_handlers::get_project)
                .put(projects_handlers::update_project)
                .delete(projects_handlers::delete_project),
        )
        .route("/{id}/reset", post(projects_handlers::reset_project))
        .route("/{id}/progress", get(projects_handlers::get_progress))
        // Stage 2: clarifying questions
        .route("/{id}/questions", get(wizard_handlers::get_questions))
        .route(
            "/{id}/questions/generate",
            post(wizard_handlers::generate_questions),
        )
        .route(
            "/{id}/questions/answers",
            put(wizard_handlers::submit_answers),
        )
        // Stage 3: tech stack
        .route("/{id}/tech-stack", get(wizard_handlers::get_tech_stack))
        .route(
            "/{id}/tech-stack/research",
            post(wizard_handlers::research_tech_stack),
        )
        .route(
            "/{id}/tech-stack/confirm",
            put(wizard_handlers::confirm_tech_stack),
        )
        // Stage 4: compatibility
        .route(
            "/{id}/compatibility",
            get(wizard_handlers::get_compatibility),
        )
        .route(
            "/{id}/compatibility/validate",
            post(wizard_handlers::validate_compatibility),
        )
        .route(
            "/{id}/compatibility/acknowledge",
            post(wizard_handlers::acknowledge_compatibility),
        )
        // Stage 5: PRD
        .route("/{id}/prd", get(wizard_handlers::get_prd))
        .route("/{id}/prd/generate", post(wizard_handlers::generate_prd))
        .route("/{id}/prd/export", post(wizard_handlers::export_prd))
        .route(
            "/{id}/prd/share",
            post(share_handlers::create_share_link).delete(share_handlers::revoke_share_link),
        )
}

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/users/me", get(users_handlers::get_current_user))
        .nest("/api/projects", create_projects_router())
        .route("/api/shared/{token}", get(share_handlers::get_shared_prd))
        .route(
            "/api/webhooks/identity",
            post(webhook_handlers::identity_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
