// ABOUTME: Per-project advisory lease serializing generation actions
// ABOUTME: One upsert takes the lease only when free or expired; release is holder-checked

use std::time::Duration;

use chrono::Utc;
use juststart_core::generate_id;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{Result, WizardError};

pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(5 * 60);

/// Proof of holding a project's generation lease
#[derive(Debug)]
#[must_use = "a lease stays held until released or expired"]
pub struct LeaseGuard {
    pub project_id: String,
    pub holder: String,
    pub operation: String,
}

pub struct GenerationLease {
    db: SqlitePool,
    ttl: Duration,
}

impl GenerationLease {
    pub fn new(db: SqlitePool) -> Self {
        Self::with_ttl(db, DEFAULT_LEASE_TTL)
    }

    pub fn with_ttl(db: SqlitePool, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Take the lease for `project_id`.
    ///
    /// An expired lease left behind by a crashed process is taken over.
    pub async fn try_acquire(&self, project_id: &str, operation: &str) -> Result<LeaseGuard> {
        let holder = generate_id();
        let now_ms = Utc::now().timestamp_millis();
        let expires_at_ms = now_ms + self.ttl.as_millis() as i64;

        let result = sqlx::query(
            "INSERT INTO generation_leases (project_id, holder, operation, expires_at_ms)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT(project_id) DO UPDATE SET
                 holder = excluded.holder,
                 operation = excluded.operation,
                 expires_at_ms = excluded.expires_at_ms
             WHERE generation_leases.expires_at_ms <= $5",
        )
        .bind(project_id)
        .bind(&holder)
        .bind(operation)
        .bind(expires_at_ms)
        .bind(now_ms)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            let running: Option<String> = sqlx::query_scalar(
                "SELECT operation FROM generation_leases WHERE project_id = $1",
            )
            .bind(project_id)
            .fetch_optional(&self.db)
            .await?;

            warn!(project_id, operation, "Generation already in progress");
            return Err(WizardError::GenerationInProgress {
                project_id: project_id.to_string(),
                operation: running.unwrap_or_else(|| operation.to_string()),
            });
        }

        info!(project_id, operation, holder = %holder, "Generation lease acquired");
        Ok(LeaseGuard {
            project_id: project_id.to_string(),
            holder,
            operation: operation.to_string(),
        })
    }

    /// Give the lease back. A lease that expired and was taken over is left alone.
    pub async fn release(&self, guard: LeaseGuard) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM generation_leases WHERE project_id = $1 AND holder = $2")
                .bind(&guard.project_id)
                .bind(&guard.holder)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            warn!(
                project_id = %guard.project_id,
                operation = %guard.operation,
                "Lease was no longer held at release"
            );
        } else {
            debug!(project_id = %guard.project_id, "Generation lease released");
        }
        Ok(())
    }
}
