// ABOUTME: Capability links granting read-only access to a PRD
// ABOUTME: One live token per PRD; expired and unknown tokens read as absent

use chrono::{Duration, Utc};
use juststart_security::{generate_share_token, Identity};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::access::Access;
use crate::artifacts::row_to_prd;
use crate::error::{Result, WizardError};
use crate::types::{ShareLink, SharedPrd};

pub const DEFAULT_SHARE_TTL_DAYS: i64 = 7;

pub struct ShareService {
    db: SqlitePool,
    access: Access,
    ttl: Duration,
}

impl ShareService {
    pub fn new(db: SqlitePool) -> Self {
        Self::with_ttl(db, Duration::days(DEFAULT_SHARE_TTL_DAYS))
    }

    pub fn with_ttl(db: SqlitePool, ttl: Duration) -> Self {
        Self {
            access: Access::new(db.clone()),
            db,
            ttl,
        }
    }

    /// Issue a fresh link for the project's PRD. Any previous link stops working.
    pub async fn create_share_link(&self, identity: &Identity, project_id: &str) -> Result<ShareLink> {
        self.access.authorize_mutation(identity, project_id).await?;

        let token = generate_share_token();
        let expires_at = Utc::now() + self.ttl;

        let result = sqlx::query(
            "UPDATE prds SET share_token = $1, share_expires_at = $2, updated_at = $3
             WHERE project_id = $4",
        )
        .bind(&token)
        .bind(expires_at)
        .bind(Utc::now())
        .bind(project_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(WizardError::missing("PRD"));
        }

        info!(project_id, %expires_at, "Share link created");
        Ok(ShareLink { token, expires_at })
    }

    pub async fn revoke_share_link(&self, identity: &Identity, project_id: &str) -> Result<()> {
        self.access.authorize_mutation(identity, project_id).await?;

        sqlx::query(
            "UPDATE prds SET share_token = NULL, share_expires_at = NULL, updated_at = $1
             WHERE project_id = $2",
        )
        .bind(Utc::now())
        .bind(project_id)
        .execute(&self.db)
        .await?;

        info!(project_id, "Share link revoked");
        Ok(())
    }

    /// Resolve a share token without any identity
    pub async fn get_shared_prd(&self, token: &str) -> Result<Option<SharedPrd>> {
        let row = sqlx::query(
            "SELECT prds.*, projects.app_name AS app_name
             FROM prds JOIN projects ON projects.id = prds.project_id
             WHERE prds.share_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let prd = row_to_prd(&row)?;
        match prd.share_expires_at {
            Some(expires_at) if expires_at > Utc::now() => Ok(Some(SharedPrd {
                app_name: row.try_get("app_name")?,
                content: prd.content,
                version: prd.version,
                generated_at: prd.generated_at,
            })),
            _ => {
                debug!(project_id = %prd.project_id, "Expired share token presented");
                Ok(None)
            }
        }
    }
}
