// ABOUTME: Error types for the wizard package
// ABOUTME: One variant per user-visible failure class plus wrapped storage and upstream errors

use juststart_ai::AIServiceError;
use juststart_core::ValidationError;
use juststart_security::UserError;
use juststart_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("No local user for this identity")]
    Unauthenticated,

    #[error("Not allowed to modify this project")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No credits remaining")]
    InsufficientCredits,

    #[error("A {operation} generation is already running for project {project_id}")]
    GenerationInProgress {
        project_id: String,
        operation: String,
    },

    #[error("Compatibility check reported critical issues; resolve them before generating the PRD")]
    CriticalCompatibility,

    #[error("AI service error: {0}")]
    Upstream(#[from] AIServiceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WizardError>;

impl WizardError {
    pub fn validation(message: impl Into<String>) -> Self {
        WizardError::Validation(message.into())
    }

    /// Missing upstream artifact, reported as a validation failure
    pub fn missing(artifact: &str) -> Self {
        WizardError::Validation(format!("{} has not been generated yet", artifact))
    }
}

impl From<ValidationError> for WizardError {
    fn from(err: ValidationError) -> Self {
        WizardError::Validation(err.to_string())
    }
}

impl From<UserError> for WizardError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => WizardError::NotFound(format!("user {}", id)),
            UserError::InsufficientCredits(_) => WizardError::InsufficientCredits,
            UserError::Storage(e) => WizardError::Storage(e),
        }
    }
}
