// ABOUTME: Shared constants and filesystem locations for Just Start
// ABOUTME: Input length limits and the data directory holding the SQLite database

use std::env;
use std::path::PathBuf;

/// Maximum length of a project's app name, in characters
pub const MAX_APP_NAME_LEN: usize = 100;

/// Maximum length of a project's app description, in characters
pub const MAX_APP_DESCRIPTION_LEN: usize = 5000;

/// Get the path to the Just Start data directory (~/.juststart)
pub fn juststart_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".juststart")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".juststart")
    }
}

/// Get the default database location (~/.juststart/juststart.db)
pub fn default_database_path() -> PathBuf {
    juststart_dir().join("juststart.db")
}
