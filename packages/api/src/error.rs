// ABOUTME: Application error type and its HTTP mapping
// ABOUTME: Sanitized messages with a machine-readable code and a request id; details only go to the log

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use juststart_security::{UserError, WebhookError};
use juststart_wizard::WizardError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Main application error type that all handlers return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Insufficient credits")]
    InsufficientCredits,

    #[error("Generation in progress: {0}")]
    GenerationInProgress(String),

    #[error("Upstream service failed: {0}")]
    Upstream(String),

    #[error("Webhook rejected: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    data: Option<()>,
    error: ErrorDetail,
    request_id: String,
}

/// Error detail structure with machine-readable codes
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl AppError {
    /// Convert AppError to appropriate HTTP status code and error code
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::InsufficientCredits => (StatusCode::PAYMENT_REQUIRED, "INSUFFICIENT_CREDITS"),
            AppError::GenerationInProgress(_) => (StatusCode::CONFLICT, "GENERATION_IN_PROGRESS"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Webhook(WebhookError::Payload(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_WEBHOOK_PAYLOAD")
            }
            AppError::Webhook(_) => (StatusCode::UNAUTHORIZED, "INVALID_WEBHOOK_SIGNATURE"),
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Get user-friendly error message (sanitized for external consumption)
    fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound => "The requested resource was not found".to_string(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Forbidden => "You do not have access to this project".to_string(),
            AppError::InsufficientCredits => {
                "You have no PRD credits left. Upgrade your plan to generate more.".to_string()
            }
            AppError::GenerationInProgress(_) => {
                "A generation is already running for this project. Please wait for it to finish."
                    .to_string()
            }
            AppError::Upstream(_) => {
                "The AI service is unavailable right now. Please try again.".to_string()
            }
            AppError::Webhook(WebhookError::Payload(_)) => "Malformed webhook payload".to_string(),
            AppError::Webhook(_) => "Webhook signature verification failed".to_string(),
            AppError::Configuration(_) => "Server configuration error".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();
        let user_message = self.to_user_message();

        // Log internal errors with full context but don't expose details
        match &self {
            AppError::Internal(err) => {
                error!(request_id = %request_id, error = %err, "Internal server error occurred");
            }
            AppError::Configuration(msg) => {
                error!(request_id = %request_id, config_error = %msg, "Configuration error");
            }
            AppError::Upstream(msg) => {
                warn!(request_id = %request_id, upstream_error = %msg, "Upstream failure");
            }
            AppError::Webhook(err) => {
                warn!(request_id = %request_id, error = %err, audit = true, "Webhook rejected");
            }
            _ => {
                info!(
                    request_id = %request_id,
                    error_code = %error_code,
                    error = %self,
                    "API error response"
                );
            }
        }

        let body = ErrorResponse {
            success: false,
            data: None,
            error: ErrorDetail {
                code: error_code.to_string(),
                message: user_message,
            },
            request_id,
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Unauthenticated => AppError::Unauthorized,
            WizardError::Forbidden => AppError::Forbidden,
            WizardError::NotFound(_) => AppError::NotFound,
            WizardError::Validation(msg) => AppError::Validation(msg),
            WizardError::CriticalCompatibility => AppError::Validation(err.to_string()),
            WizardError::InsufficientCredits => AppError::InsufficientCredits,
            WizardError::GenerationInProgress { .. } => {
                AppError::GenerationInProgress(err.to_string())
            }
            WizardError::Upstream(e) => AppError::Upstream(e.to_string()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        WizardError::from(err).into()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;
