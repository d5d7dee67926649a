// ABOUTME: User type definitions
// ABOUTME: Structures for user accounts, subscriptions, and credit errors

use chrono::{DateTime, Utc};
use juststart_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Insufficient credits for user {0}")]
    InsufficientCredits(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type UserResult<T> = Result<T, UserError>;

/// Subscription tier and remaining PRD-generation credits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub tier: String,
    pub credits: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub prds_generated: i64,
    pub subscription: Subscription,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_credits(&self) -> bool {
        self.subscription.credits > 0
    }
}

/// Profile fields mirrored from the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub external_id: String,
    pub email: String,
    pub name: String,
}

/// Subscription granted to users the first time they are seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionDefaults {
    pub tier: String,
    pub credits: i64,
}

impl Default for SubscriptionDefaults {
    fn default() -> Self {
        Self {
            tier: "free".to_string(),
            credits: 1,
        }
    }
}
