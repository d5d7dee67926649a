// ABOUTME: Users, credits, identity, and signed-payload verification for Just Start
// ABOUTME: Provides the credit gate, identity resolution, share tokens, and webhook signatures

pub mod identity;
pub mod tokens;
pub mod users;
pub mod webhook;

// Re-export main types for convenience
pub use identity::Identity;
pub use tokens::generate_share_token;
pub use users::storage::UserStorage;
pub use users::{IdentityProfile, Subscription, SubscriptionDefaults, User, UserError};
pub use webhook::{IdentityEvent, WebhookError, WebhookHeaders, WebhookVerifier};
