// ABOUTME: Project lifecycle management with CRUD operations
// ABOUTME: Handles creation, ownership-checked reads and writes, the reset cascade, and stage transitions

use chrono::Utc;
use juststart_core::{generate_id, validate_app_description, validate_app_name};
use juststart_security::Identity;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, error, info};

use crate::access::Access;
use crate::artifacts::{delete_artifact, ArtifactStore};
use crate::error::{Result, WizardError};
use crate::stage::{ArtifactKind, Stage};
use crate::types::*;

const PROJECT_COLUMNS: &str = "id, user_id, app_name, app_description, status, current_step, \
     generation_progress, created_at, updated_at, last_accessed_at";

/// Manager for wizard projects
pub struct ProjectManager {
    db: SqlitePool,
    access: Access,
    artifacts: ArtifactStore,
}

impl ProjectManager {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            access: Access::new(db.clone()),
            artifacts: ArtifactStore::new(db.clone()),
            db,
        }
    }

    /// Create a new project in the draft stage
    pub async fn create_project(
        &self,
        identity: &Identity,
        input: CreateProjectInput,
    ) -> Result<Project> {
        let user = self.access.resolve_user(identity).await?;
        let app_name = validate_app_name(&input.app_name)?;
        let app_description = validate_app_description(&input.app_description)?;

        let id = generate_id();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO projects (id, user_id, app_name, app_description, status, current_step, created_at, updated_at, last_accessed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&id)
        .bind(&user.id)
        .bind(&app_name)
        .bind(&app_description)
        .bind(ProjectStatus::Draft)
        .bind(ProjectStatus::Draft.step())
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        info!(project_id = %id, user_id = %user.id, "Created project");
        row_to_project(&row)
    }

    /// Get a project the caller owns, recording the access time
    pub async fn get_project(&self, identity: &Identity, project_id: &str) -> Result<Option<Project>> {
        let Some((_, mut project)) = self.access.authorize_read(identity, project_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        sqlx::query("UPDATE projects SET last_accessed_at = $1 WHERE id = $2")
            .bind(now)
            .bind(project_id)
            .execute(&self.db)
            .await?;
        project.last_accessed_at = now;

        Ok(Some(project))
    }

    /// List the caller's projects, most recently updated first
    pub async fn list_projects(&self, identity: &Identity) -> Result<Vec<Project>> {
        let user = self.access.resolve_user(identity).await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY updated_at DESC",
            PROJECT_COLUMNS
        ))
        .bind(&user.id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(row_to_project).collect()
    }

    /// Rename or re-describe a project. Stage state is left alone.
    pub async fn update_project(
        &self,
        identity: &Identity,
        project_id: &str,
        input: UpdateProjectInput,
    ) -> Result<Project> {
        let (_, project) = self.access.authorize_mutation(identity, project_id).await?;

        let app_name = match input.app_name {
            Some(name) => validate_app_name(&name)?,
            None => project.app_name,
        };
        let app_description = match input.app_description {
            Some(description) => validate_app_description(&description)?,
            None => project.app_description,
        };

        let row = sqlx::query(&format!(
            "UPDATE projects SET app_name = $1, app_description = $2, updated_at = $3
             WHERE id = $4
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&app_name)
        .bind(&app_description)
        .bind(Utc::now())
        .bind(project_id)
        .fetch_one(&self.db)
        .await?;

        info!(project_id, "Updated project");
        row_to_project(&row)
    }

    /// Delete a project and everything hanging off it in one transaction
    pub async fn delete_project(&self, identity: &Identity, project_id: &str) -> Result<()> {
        self.access.authorize_mutation(identity, project_id).await?;

        let mut tx = self.db.begin().await?;
        for kind in ArtifactKind::ALL {
            delete_artifact(&mut *tx, kind, project_id).await?;
        }
        sqlx::query("DELETE FROM generation_leases WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(project_id, "Deleted project");
        Ok(())
    }

    /// Return to an earlier stage, discarding every artifact downstream of it.
    ///
    /// Runs in one transaction; on failure nothing is deleted and the error is
    /// logged with the artifact kinds that had already been removed in the
    /// rolled-back transaction.
    pub async fn reset_from_stage(
        &self,
        identity: &Identity,
        project_id: &str,
        stage: Stage,
    ) -> Result<Project> {
        self.access.authorize_mutation(identity, project_id).await?;

        let mut deleted = Vec::new();
        match self.reset_in_transaction(project_id, stage, &mut deleted).await {
            Ok(project) => {
                info!(project_id, stage = stage.number(), purged = ?deleted, "Reset project");
                Ok(project)
            }
            Err(e) => {
                error!(
                    project_id,
                    stage = stage.number(),
                    deleted_before_failure = ?deleted,
                    "Reset failed and was rolled back: {}",
                    e
                );
                Err(e)
            }
        }
    }

    async fn reset_in_transaction(
        &self,
        project_id: &str,
        stage: Stage,
        deleted: &mut Vec<ArtifactKind>,
    ) -> Result<Project> {
        let mut tx = self.db.begin().await?;

        for &kind in stage.purged_artifacts() {
            delete_artifact(&mut *tx, kind, project_id).await?;
            deleted.push(kind);
        }

        let (status, step) = stage.reset_status();
        let row = sqlx::query(&format!(
            "UPDATE projects
             SET status = $1, current_step = $2, generation_progress = NULL, updated_at = $3
             WHERE id = $4
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(status)
        .bind(step)
        .bind(Utc::now())
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?;

        let project = row_to_project(&row)?;
        tx.commit().await?;
        Ok(project)
    }

    // ------------------------------------------------------------------
    // Authorized artifact reads
    // ------------------------------------------------------------------

    pub async fn get_questions(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<Option<QuestionSet>> {
        match self.access.authorize_read(identity, project_id).await? {
            Some(_) => self.artifacts.get_questions(project_id).await,
            None => Ok(None),
        }
    }

    pub async fn get_tech_stack(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<Option<TechStackRecommendation>> {
        match self.access.authorize_read(identity, project_id).await? {
            Some(_) => self.artifacts.get_tech_stack(project_id).await,
            None => Ok(None),
        }
    }

    pub async fn get_compatibility(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<Option<CompatibilityCheck>> {
        match self.access.authorize_read(identity, project_id).await? {
            Some(_) => self.artifacts.get_compatibility(project_id).await,
            None => Ok(None),
        }
    }

    pub async fn get_prd(&self, identity: &Identity, project_id: &str) -> Result<Option<Prd>> {
        match self.access.authorize_read(identity, project_id).await? {
            Some(_) => self.artifacts.get_prd(project_id).await,
            None => Ok(None),
        }
    }

    /// Progress of a running generation action, if any
    pub async fn get_progress(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<Option<GenerationProgress>> {
        Ok(self
            .access
            .authorize_read(identity, project_id)
            .await?
            .and_then(|(_, project)| project.generation_progress))
    }

    // ------------------------------------------------------------------
    // Authorized user decisions
    // ------------------------------------------------------------------

    /// Record the user's answers and move on to tech stack research
    pub async fn submit_answers(
        &self,
        identity: &Identity,
        project_id: &str,
        answers: Answers,
    ) -> Result<QuestionSet> {
        self.access.authorize_mutation(identity, project_id).await?;

        let set = self.artifacts.save_answers(project_id, answers).await?;
        set_status(&self.db, project_id, ProjectStatus::Research).await?;

        info!(project_id, answered = set.answers.as_ref().map_or(0, |a| a.len()), "Answers submitted");
        Ok(set)
    }

    /// Lock in the stack and move on to validation
    pub async fn confirm_tech_stack(
        &self,
        identity: &Identity,
        project_id: &str,
        selection: StackSelection,
    ) -> Result<TechStackRecommendation> {
        self.access.authorize_mutation(identity, project_id).await?;

        let stack = self.artifacts.confirm_tech_stack(project_id, selection).await?;
        set_status(&self.db, project_id, ProjectStatus::Validation).await?;

        info!(project_id, "Tech stack confirmed");
        Ok(stack)
    }

    /// Accept a check that reported warnings so the PRD stage can proceed
    pub async fn acknowledge_compatibility(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<CompatibilityCheck> {
        self.access.authorize_mutation(identity, project_id).await?;

        let check = self.artifacts.acknowledge_compatibility(project_id).await?;
        info!(project_id, "Compatibility warnings acknowledged");
        Ok(check)
    }
}

/// Load a project by id without any ownership check
pub(crate) async fn fetch_project(db: &SqlitePool, project_id: &str) -> Result<Option<Project>> {
    debug!("Fetching project: {}", project_id);

    let row = sqlx::query(&format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS))
        .bind(project_id)
        .fetch_optional(db)
        .await?;

    row.as_ref().map(row_to_project).transpose()
}

/// Record a stage transition
pub(crate) async fn set_status(
    db: &SqlitePool,
    project_id: &str,
    status: ProjectStatus,
) -> Result<()> {
    let mut conn = db.acquire().await?;
    set_status_on(&mut conn, project_id, status).await
}

/// Stage transition on a caller-owned connection or transaction
pub(crate) async fn set_status_on(
    conn: &mut SqliteConnection,
    project_id: &str,
    status: ProjectStatus,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE projects SET status = $1, current_step = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(status)
    .bind(status.step())
    .bind(Utc::now())
    .bind(project_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(WizardError::NotFound(format!("project {}", project_id)));
    }
    debug!(project_id, ?status, "Project status updated");
    Ok(())
}

fn row_to_project(row: &SqliteRow) -> Result<Project> {
    let generation_progress = row
        .try_get::<Option<String>, _>("generation_progress")?
        .map(|s| serde_json::from_str::<GenerationProgress>(&s))
        .transpose()?;

    Ok(Project {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        app_name: row.try_get("app_name")?,
        app_description: row.try_get("app_description")?,
        status: row.try_get("status")?,
        current_step: row.try_get("current_step")?,
        generation_progress,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_accessed_at: row.try_get("last_accessed_at")?,
    })
}
