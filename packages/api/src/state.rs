// ABOUTME: Shared application state handed to every handler
// ABOUTME: Wires the wizard services, user storage, and the webhook verifier over one pool

use std::sync::Arc;
use std::time::Duration;

use juststart_security::{SubscriptionDefaults, UserStorage, WebhookError, WebhookVerifier};
use juststart_wizard::{
    ContentGenerator, Exporter, GenerationService, ProjectManager, ShareService,
    DEFAULT_LEASE_TTL, DEFAULT_SHARE_TTL_DAYS,
};
use sqlx::SqlitePool;

/// Tunables the binary reads from its configuration
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub webhook_secret: Option<String>,
    pub subscription_defaults: SubscriptionDefaults,
    pub share_link_ttl: chrono::Duration,
    pub generation_lease_ttl: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            subscription_defaults: SubscriptionDefaults::default(),
            share_link_ttl: chrono::Duration::days(DEFAULT_SHARE_TTL_DAYS),
            generation_lease_ttl: DEFAULT_LEASE_TTL,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub projects: Arc<ProjectManager>,
    pub generation: Arc<GenerationService>,
    pub shares: Arc<ShareService>,
    pub exporter: Arc<Exporter>,
    pub users: Arc<UserStorage>,
    pub webhook: Option<Arc<WebhookVerifier>>,
    pub subscription_defaults: SubscriptionDefaults,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        generator: Arc<dyn ContentGenerator>,
        settings: ApiSettings,
    ) -> Result<Self, WebhookError> {
        let webhook = settings
            .webhook_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(WebhookVerifier::new)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            projects: Arc::new(ProjectManager::new(pool.clone())),
            generation: Arc::new(
                GenerationService::new(pool.clone(), generator)
                    .with_lease_ttl(settings.generation_lease_ttl),
            ),
            shares: Arc::new(ShareService::with_ttl(pool.clone(), settings.share_link_ttl)),
            exporter: Arc::new(Exporter::new(pool.clone())),
            users: Arc::new(UserStorage::new(pool.clone())),
            webhook,
            subscription_defaults: settings.subscription_defaults,
            pool,
        })
    }
}
