// ABOUTME: Generation progress tracker stored on the project row
// ABOUTME: Set at the start of an action, updated at checkpoints, cleared on success and failure

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::types::GenerationProgress;

pub struct ProgressTracker {
    db: SqlitePool,
}

impl ProgressTracker {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Overwrite the progress record. `progress` is clamped to 0-100.
    pub async fn set(
        &self,
        project_id: &str,
        stage: &str,
        progress: i32,
        message: &str,
    ) -> Result<GenerationProgress> {
        let record = GenerationProgress {
            stage: stage.to_string(),
            progress: progress.clamp(0, 100) as u8,
            message: message.to_string(),
            updated_at: Utc::now(),
        };

        sqlx::query("UPDATE projects SET generation_progress = $1 WHERE id = $2")
            .bind(serde_json::to_string(&record)?)
            .bind(project_id)
            .execute(&self.db)
            .await?;

        debug!(project_id, stage, progress = record.progress, "Progress updated");
        Ok(record)
    }

    pub async fn get(&self, project_id: &str) -> Result<Option<GenerationProgress>> {
        let raw: Option<Option<String>> =
            sqlx::query_scalar("SELECT generation_progress FROM projects WHERE id = $1")
                .bind(project_id)
                .fetch_optional(&self.db)
                .await?;

        raw.flatten()
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(Into::into)
    }

    pub async fn clear(&self, project_id: &str) -> Result<()> {
        sqlx::query("UPDATE projects SET generation_progress = NULL WHERE id = $1")
            .bind(project_id)
            .execute(&self.db)
            .await?;

        debug!(project_id, "Progress cleared");
        Ok(())
    }
}
