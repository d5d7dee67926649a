// ABOUTME: Persistence for the four per-project stage artifacts
// ABOUTME: Upserts keyed by project_id; replacing an earlier artifact drops everything downstream of it

use chrono::Utc;
use juststart_core::generate_id;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{Result, WizardError};
use crate::stage::{ArtifactKind, Stage};
use crate::types::*;

/// Trusted artifact store. Callers are expected to have authorized the project already.
pub struct ArtifactStore {
    db: SqlitePool,
}

impl ArtifactStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Question sets
    // ------------------------------------------------------------------

    /// Replace the project's questions. Any previous answers are dropped, along
    /// with the tech stack, compatibility check, and PRD built on them.
    pub async fn save_questions(&self, project_id: &str, questions: &[Question]) -> Result<QuestionSet> {
        debug!(project_id, count = questions.len(), "Saving question set");
        let now = Utc::now();

        let mut tx = self.db.begin().await?;
        purge_downstream(&mut tx, Stage::Questions, project_id).await?;

        let row = sqlx::query(
            "INSERT INTO question_sets (id, project_id, questions, answers, answered_at, created_at, updated_at)
             VALUES ($1, $2, $3, NULL, NULL, $4, $5)
             ON CONFLICT(project_id) DO UPDATE SET
                 questions = excluded.questions,
                 answers = NULL,
                 answered_at = NULL,
                 updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(generate_id())
        .bind(project_id)
        .bind(serde_json::to_string(questions)?)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let set = row_to_question_set(&row)?;
        tx.commit().await?;
        Ok(set)
    }

    pub async fn get_questions(&self, project_id: &str) -> Result<Option<QuestionSet>> {
        let row = sqlx::query("SELECT * FROM question_sets WHERE project_id = $1")
            .bind(project_id)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(row_to_question_set).transpose()
    }

    /// Attach answers to the question set.
    ///
    /// Every key must name a known question; questions left unanswered (or
    /// answered with blank text) take their default answer. Artifacts built
    /// on earlier answers are dropped.
    pub async fn save_answers(&self, project_id: &str, answers: Answers) -> Result<QuestionSet> {
        let set = self
            .get_questions(project_id)
            .await?
            .ok_or_else(|| WizardError::missing("Question set"))?;

        if let Some(unknown) = answers
            .keys()
            .find(|id| !set.questions.iter().any(|q| &q.id == *id))
        {
            return Err(WizardError::validation(format!("Unknown question id: {}", unknown)));
        }

        let complete: Answers = set
            .questions
            .iter()
            .map(|q| {
                let answer = answers
                    .get(&q.id)
                    .map(|a| a.trim())
                    .filter(|a| !a.is_empty())
                    .unwrap_or(q.default_answer.as_str());
                (q.id.clone(), answer.to_string())
            })
            .collect();

        debug!(project_id, "Saving answers");
        let now = Utc::now();

        let mut tx = self.db.begin().await?;
        purge_downstream(&mut tx, Stage::Questions, project_id).await?;

        let row = sqlx::query(
            "UPDATE question_sets SET answers = $1, answered_at = $2, updated_at = $3
             WHERE project_id = $4
             RETURNING *",
        )
        .bind(serde_json::to_string(&complete)?)
        .bind(now)
        .bind(now)
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?;

        let set = row_to_question_set(&row)?;
        tx.commit().await?;
        Ok(set)
    }

    // ------------------------------------------------------------------
    // Tech stack recommendations
    // ------------------------------------------------------------------

    /// Replace the research and recommendations. Any confirmed selection is
    /// dropped, along with the compatibility check and PRD.
    pub async fn save_tech_stack(
        &self,
        project_id: &str,
        research: &TechStackResearch,
    ) -> Result<TechStackRecommendation> {
        debug!(project_id, "Saving tech stack recommendation");
        let now = Utc::now();

        let mut tx = self.db.begin().await?;
        purge_downstream(&mut tx, Stage::TechStack, project_id).await?;

        let row = sqlx::query(
            "INSERT INTO tech_stack_recommendations
                 (id, project_id, research_queries, research_results, recommendations, confirmed_stack, confirmed_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, NULL, NULL, $6, $7)
             ON CONFLICT(project_id) DO UPDATE SET
                 research_queries = excluded.research_queries,
                 research_results = excluded.research_results,
                 recommendations = excluded.recommendations,
                 confirmed_stack = NULL,
                 confirmed_at = NULL,
                 updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(generate_id())
        .bind(project_id)
        .bind(serde_json::to_string(&research.research_queries)?)
        .bind(&research.research_results)
        .bind(serde_json::to_string(&research.recommendations)?)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let rec = row_to_tech_stack(&row)?;
        tx.commit().await?;
        Ok(rec)
    }

    pub async fn get_tech_stack(&self, project_id: &str) -> Result<Option<TechStackRecommendation>> {
        let row = sqlx::query("SELECT * FROM tech_stack_recommendations WHERE project_id = $1")
            .bind(project_id)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(row_to_tech_stack).transpose()
    }

    /// Lock in one technology per category. A check or PRD made against an
    /// earlier selection is dropped.
    pub async fn confirm_tech_stack(
        &self,
        project_id: &str,
        selection: StackSelection,
    ) -> Result<TechStackRecommendation> {
        if self.get_tech_stack(project_id).await?.is_none() {
            return Err(WizardError::missing("Tech stack recommendation"));
        }

        if let Some(unknown) = selection
            .keys()
            .find(|c| !TECH_CATEGORIES.contains(&c.as_str()))
        {
            return Err(WizardError::validation(format!("Unknown tech stack category: {}", unknown)));
        }

        let mut confirmed = StackSelection::new();
        for category in TECH_CATEGORIES {
            let technology = selection
                .get(category)
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    WizardError::validation(format!("A {} technology must be selected", category))
                })?;
            confirmed.insert(category.to_string(), technology.to_string());
        }

        debug!(project_id, "Confirming tech stack");
        let now = Utc::now();

        let mut tx = self.db.begin().await?;
        purge_downstream(&mut tx, Stage::TechStack, project_id).await?;

        let row = sqlx::query(
            "UPDATE tech_stack_recommendations SET confirmed_stack = $1, confirmed_at = $2, updated_at = $3
             WHERE project_id = $4
             RETURNING *",
        )
        .bind(serde_json::to_string(&confirmed)?)
        .bind(now)
        .bind(now)
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?;

        let rec = row_to_tech_stack(&row)?;
        tx.commit().await?;
        Ok(rec)
    }

    // ------------------------------------------------------------------
    // Compatibility checks
    // ------------------------------------------------------------------

    /// Replace the check. A previous acknowledgement does not carry over and
    /// any PRD is dropped.
    pub async fn save_compatibility(
        &self,
        project_id: &str,
        report: &CompatibilityReport,
    ) -> Result<CompatibilityCheck> {
        debug!(project_id, status = ?report.status, "Saving compatibility check");
        let now = Utc::now();

        let mut tx = self.db.begin().await?;
        purge_downstream(&mut tx, Stage::Validation, project_id).await?;

        let row = sqlx::query(
            "INSERT INTO compatibility_checks (id, project_id, status, issues, summary, acknowledged_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, NULL, $6, $7)
             ON CONFLICT(project_id) DO UPDATE SET
                 status = excluded.status,
                 issues = excluded.issues,
                 summary = excluded.summary,
                 acknowledged_at = NULL,
                 updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(generate_id())
        .bind(project_id)
        .bind(report.status)
        .bind(serde_json::to_string(&report.issues)?)
        .bind(&report.summary)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let check = row_to_compatibility(&row)?;
        tx.commit().await?;
        Ok(check)
    }

    pub async fn get_compatibility(&self, project_id: &str) -> Result<Option<CompatibilityCheck>> {
        let row = sqlx::query("SELECT * FROM compatibility_checks WHERE project_id = $1")
            .bind(project_id)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(row_to_compatibility).transpose()
    }

    pub async fn acknowledge_compatibility(&self, project_id: &str) -> Result<CompatibilityCheck> {
        let now = Utc::now();
        let row = sqlx::query(
            "UPDATE compatibility_checks SET acknowledged_at = $1, updated_at = $2
             WHERE project_id = $3
             RETURNING *",
        )
        .bind(now)
        .bind(now)
        .bind(project_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| WizardError::missing("Compatibility check"))?;

        row_to_compatibility(&row)
    }

    // ------------------------------------------------------------------
    // PRDs
    // ------------------------------------------------------------------

    pub async fn get_prd(&self, project_id: &str) -> Result<Option<Prd>> {
        let row = sqlx::query("SELECT * FROM prds WHERE project_id = $1")
            .bind(project_id)
            .fetch_optional(&self.db)
            .await?;

        row.as_ref().map(row_to_prd).transpose()
    }
}

/// Store a freshly generated PRD on a caller-owned connection or transaction:
/// version 1 on first save, +1 on every regeneration
pub(crate) async fn save_prd_on(
    conn: &mut SqliteConnection,
    project_id: &str,
    content: &PrdContent,
) -> Result<Prd> {
    let now = Utc::now();

    let row = sqlx::query(
        "INSERT INTO prds (id, project_id, content, version, generated_at, created_at, updated_at)
         VALUES ($1, $2, $3, 1, $4, $5, $6)
         ON CONFLICT(project_id) DO UPDATE SET
             content = excluded.content,
             version = prds.version + 1,
             generated_at = excluded.generated_at,
             updated_at = excluded.updated_at
         RETURNING *",
    )
    .bind(generate_id())
    .bind(project_id)
    .bind(serde_json::to_string(content)?)
    .bind(now)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;

    let prd = row_to_prd(&row)?;
    debug!(project_id, version = prd.version, "Saved PRD");
    Ok(prd)
}

/// Drop the artifacts that depend on `stage`'s output
async fn purge_downstream(conn: &mut SqliteConnection, stage: Stage, project_id: &str) -> Result<()> {
    for &kind in stage.purged_artifacts() {
        delete_artifact(&mut *conn, kind, project_id).await?;
    }
    Ok(())
}

/// Delete one artifact row on a caller-owned connection or transaction
pub(crate) async fn delete_artifact(
    conn: &mut SqliteConnection,
    kind: ArtifactKind,
    project_id: &str,
) -> Result<u64> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE project_id = $1", kind.table()))
        .bind(project_id)
        .execute(conn)
        .await?;

    debug!(project_id, %kind, rows = result.rows_affected(), "Deleted artifact");
    Ok(result.rows_affected())
}

fn json_column<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T> {
    let raw: String = row.try_get(column)?;
    Ok(serde_json::from_str(&raw)?)
}

fn optional_json_column<T: serde::de::DeserializeOwned>(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<T>> {
    row.try_get::<Option<String>, _>(column)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(WizardError::from)
}

fn row_to_question_set(row: &SqliteRow) -> Result<QuestionSet> {
    Ok(QuestionSet {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        questions: json_column(row, "questions")?,
        answers: optional_json_column(row, "answers")?,
        answered_at: row.try_get("answered_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_tech_stack(row: &SqliteRow) -> Result<TechStackRecommendation> {
    Ok(TechStackRecommendation {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        research_queries: json_column(row, "research_queries")?,
        research_results: row.try_get("research_results")?,
        recommendations: json_column(row, "recommendations")?,
        confirmed_stack: optional_json_column(row, "confirmed_stack")?,
        confirmed_at: row.try_get("confirmed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_compatibility(row: &SqliteRow) -> Result<CompatibilityCheck> {
    Ok(CompatibilityCheck {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        status: row.try_get("status")?,
        issues: json_column(row, "issues")?,
        summary: row.try_get("summary")?,
        acknowledged_at: row.try_get("acknowledged_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn row_to_prd(row: &SqliteRow) -> Result<Prd> {
    Ok(Prd {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        content: json_column(row, "content")?,
        version: row.try_get("version")?,
        generated_at: row.try_get("generated_at")?,
        exported_at: row.try_get("exported_at")?,
        share_token: row.try_get("share_token")?,
        share_expires_at: row.try_get("share_expires_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
