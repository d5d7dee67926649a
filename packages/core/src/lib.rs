// ABOUTME: Core utilities for Just Start
// ABOUTME: Foundational package providing IDs, paths, and input validation shared by all packages

pub mod constants;
pub mod utils;
pub mod validation;

// Re-export constants
pub use constants::{default_database_path, juststart_dir, MAX_APP_DESCRIPTION_LEN, MAX_APP_NAME_LEN};

// Re-export utilities
pub use utils::generate_id;

// Re-export validation
pub use validation::{
    truncate, validate_app_description, validate_app_name, ValidationError,
};
