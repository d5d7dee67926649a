// ABOUTME: Liveness endpoint
// ABOUTME: Reports service status and whether the database answers

use axum::{extract::State, response::IntoResponse};
use serde_json::json;
use tracing::warn;

use crate::response::ok;
use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Health check database probe failed: {}", e);
            "unavailable"
        }
    };

    ok(json!({
        "status": "healthy",
        "service": "juststart",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
