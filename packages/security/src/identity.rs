// ABOUTME: Explicit caller identity passed into every operation
// ABOUTME: Carries the identity-provider subject; there is no ambient current user

use serde::{Deserialize, Serialize};

/// The authenticated caller, as asserted by the identity provider.
///
/// `subject` is the provider's user id and maps to `users.external_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}
