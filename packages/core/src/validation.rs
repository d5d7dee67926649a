// ABOUTME: Input validation for user-supplied project fields
// ABOUTME: Trims and bounds app names and descriptions before they reach storage

use serde::Serialize;
use thiserror::Error;

use crate::constants::{MAX_APP_DESCRIPTION_LEN, MAX_APP_NAME_LEN};

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate and normalize an app name. Returns the trimmed name.
pub fn validate_app_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("appName", "App name is required"));
    }
    if trimmed.chars().count() > MAX_APP_NAME_LEN {
        return Err(ValidationError::new(
            "appName",
            format!("App name must be at most {} characters", MAX_APP_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate and normalize an app description. Returns the trimmed description.
pub fn validate_app_description(description: &str) -> Result<String, ValidationError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            "appDescription",
            "App description is required",
        ));
    }
    if trimmed.chars().count() > MAX_APP_DESCRIPTION_LEN {
        return Err(ValidationError::new(
            "appDescription",
            format!(
                "App description must be at most {} characters",
                MAX_APP_DESCRIPTION_LEN
            ),
        ));
    }
    Ok(trimmed.to_string())
}

/// Truncate a string to `max_chars` characters, appending an ellipsis when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
