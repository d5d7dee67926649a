// ABOUTME: Identity-provider webhook endpoint
// ABOUTME: Verifies the delivery signature, then mirrors user lifecycle events into local storage

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use juststart_security::{IdentityEvent, WebhookError, WebhookHeaders};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{ApiResult, AppError};
use crate::response::ok;
use crate::state::AppState;

const HEADER_ID: &str = "svix-id";
const HEADER_TIMESTAMP: &str = "svix-timestamp";
const HEADER_SIGNATURE: &str = "svix-signature";

fn header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or(WebhookError::MissingHeader(name))
}

fn signing_headers(headers: &HeaderMap) -> Result<WebhookHeaders, WebhookError> {
    Ok(WebhookHeaders {
        id: header(headers, HEADER_ID)?,
        timestamp: header(headers, HEADER_TIMESTAMP)?,
        signature: header(headers, HEADER_SIGNATURE)?,
    })
}

/// Receive a user lifecycle event from the identity provider
pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let verifier = state
        .webhook
        .as_ref()
        .ok_or_else(|| AppError::config("IDENTITY_WEBHOOK_SECRET is not set"))?;

    let signing = signing_headers(&headers)?;
    verifier.verify(&signing, &body)?;

    match IdentityEvent::parse(&body)? {
        IdentityEvent::UserUpserted(profile) => {
            let user = state
                .users
                .upsert_from_identity(&profile, &state.subscription_defaults)
                .await?;
            info!(user_id = %user.id, external_id = %profile.external_id, "User synced from identity provider");
        }
        IdentityEvent::UserDeleted { external_id } => {
            let deleted = state.users.delete_by_external_id(&external_id).await?;
            info!(external_id = %external_id, deleted, "User deletion received from identity provider");
        }
        IdentityEvent::Ignored { event_type } => {
            debug!(event_type = %event_type, "Ignoring identity event");
        }
    }

    Ok(ok(json!({ "received": true })))
}
