// ABOUTME: Generation pipeline driving the four AI-backed wizard actions
// ABOUTME: Authorize, check preconditions, hold the lease, report progress, save, and charge credits

use std::sync::Arc;
use std::time::Duration;

use juststart_security::{Identity, UserStorage};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::access::Access;
use crate::artifacts::{save_prd_on, ArtifactStore};
use crate::error::{Result, WizardError};
use crate::generator::ContentGenerator;
use crate::lease::{GenerationLease, LeaseGuard};
use crate::manager::{set_status, set_status_on};
use crate::progress::ProgressTracker;
use crate::types::*;

const OP_QUESTIONS: &str = "questions";
const OP_RESEARCH: &str = "research";
const OP_COMPATIBILITY: &str = "compatibility";
const OP_PRD: &str = "prd";

pub struct GenerationService {
    db: SqlitePool,
    access: Access,
    artifacts: ArtifactStore,
    progress: ProgressTracker,
    lease: GenerationLease,
    generator: Arc<dyn ContentGenerator>,
}

impl GenerationService {
    pub fn new(db: SqlitePool, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            access: Access::new(db.clone()),
            artifacts: ArtifactStore::new(db.clone()),
            progress: ProgressTracker::new(db.clone()),
            lease: GenerationLease::new(db.clone()),
            generator,
            db,
        }
    }

    pub fn with_lease_ttl(mut self, ttl: Duration) -> Self {
        self.lease = GenerationLease::with_ttl(self.db.clone(), ttl);
        self
    }

    /// Stage 2: generate clarifying questions from the app description
    pub async fn generate_questions(&self, identity: &Identity, project_id: &str) -> Result<QuestionSet> {
        let (_, project) = self.access.authorize_mutation(identity, project_id).await?;
        info!(project_id, "Generating questions");

        let guard = self.begin(project_id, OP_QUESTIONS, "Reading your app idea").await?;
        let outcome = self.questions_under_lease(&project).await;
        self.finish(guard, outcome).await
    }

    async fn questions_under_lease(&self, project: &Project) -> Result<QuestionSet> {
        self.checkpoint(&project.id, OP_QUESTIONS, 30, "Writing clarifying questions")
            .await?;
        let questions = self.generator.generate_questions(project).await?;

        self.checkpoint(&project.id, OP_QUESTIONS, 90, "Saving questions").await?;
        let set = self.artifacts.save_questions(&project.id, &questions).await?;
        set_status(&self.db, &project.id, ProjectStatus::Questions).await?;
        Ok(set)
    }

    /// Stage 3: research and recommend a tech stack. Requires submitted answers.
    pub async fn research_tech_stack(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<TechStackRecommendation> {
        let (_, project) = self.access.authorize_mutation(identity, project_id).await?;
        let questions = self
            .artifacts
            .get_questions(project_id)
            .await?
            .filter(QuestionSet::is_answered)
            .ok_or_else(|| WizardError::missing("Answers to the clarifying questions"))?;
        info!(project_id, "Researching tech stack");

        let guard = self.begin(project_id, OP_RESEARCH, "Starting research").await?;
        let outcome = self.research_under_lease(&project, &questions).await;
        self.finish(guard, outcome).await
    }

    async fn research_under_lease(
        &self,
        project: &Project,
        questions: &QuestionSet,
    ) -> Result<TechStackRecommendation> {
        self.checkpoint(&project.id, OP_RESEARCH, 20, "Researching current technologies")
            .await?;
        let research = self.generator.research_tech_stack(project, questions).await?;

        self.checkpoint(&project.id, OP_RESEARCH, 90, "Saving recommendations").await?;
        let recommendation = self.artifacts.save_tech_stack(&project.id, &research).await?;
        set_status(&self.db, &project.id, ProjectStatus::Confirmation).await?;
        Ok(recommendation)
    }

    /// Stage 4: check the confirmed stack for compatibility problems
    pub async fn validate_compatibility(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<CompatibilityCheck> {
        let (_, project) = self.access.authorize_mutation(identity, project_id).await?;
        let stack = self
            .artifacts
            .get_tech_stack(project_id)
            .await?
            .and_then(|rec| rec.confirmed_stack)
            .ok_or_else(|| WizardError::missing("Confirmed tech stack"))?;
        info!(project_id, "Validating compatibility");

        let guard = self.begin(project_id, OP_COMPATIBILITY, "Checking your stack").await?;
        let outcome = self.compatibility_under_lease(&project, &stack).await;
        self.finish(guard, outcome).await
    }

    async fn compatibility_under_lease(
        &self,
        project: &Project,
        stack: &StackSelection,
    ) -> Result<CompatibilityCheck> {
        self.checkpoint(&project.id, OP_COMPATIBILITY, 40, "Looking for integration issues")
            .await?;
        let report = self.generator.validate_compatibility(project, stack).await?;

        self.checkpoint(&project.id, OP_COMPATIBILITY, 90, "Saving results").await?;
        let check = self.artifacts.save_compatibility(&project.id, &report).await?;
        set_status(&self.db, &project.id, ProjectStatus::Validation).await?;
        Ok(check)
    }

    /// Stage 5: write the PRD and charge one credit in the same transaction as the save
    pub async fn generate_prd(&self, identity: &Identity, project_id: &str) -> Result<Prd> {
        let (user, project) = self.access.authorize_mutation(identity, project_id).await?;

        let questions = self
            .artifacts
            .get_questions(project_id)
            .await?
            .filter(QuestionSet::is_answered)
            .ok_or_else(|| WizardError::missing("Answers to the clarifying questions"))?;
        let stack = self
            .artifacts
            .get_tech_stack(project_id)
            .await?
            .filter(|rec| rec.confirmed_stack.is_some())
            .ok_or_else(|| WizardError::missing("Confirmed tech stack"))?;
        let compatibility = self
            .artifacts
            .get_compatibility(project_id)
            .await?
            .ok_or_else(|| WizardError::missing("Compatibility check"))?;

        match compatibility.status {
            CompatibilityStatus::Critical => return Err(WizardError::CriticalCompatibility),
            CompatibilityStatus::Warnings if !compatibility.allows_prd() => {
                return Err(WizardError::validation(
                    "Acknowledge the compatibility warnings before generating the PRD",
                ))
            }
            _ => {}
        }

        if !user.has_credits() {
            warn!(project_id, user_id = %user.id, "PRD generation refused: no credits");
            return Err(WizardError::InsufficientCredits);
        }
        info!(project_id, user_id = %user.id, "Generating PRD");

        let guard = self.begin(project_id, OP_PRD, "Gathering your answers").await?;
        let context = PrdContext {
            project: &project,
            questions: &questions,
            stack: &stack,
            compatibility: &compatibility,
        };
        let outcome = self.prd_under_lease(&user.id, context).await;
        self.finish(guard, outcome).await
    }

    async fn prd_under_lease(&self, user_id: &str, context: PrdContext<'_>) -> Result<Prd> {
        let project: &Project = context.project;
        let project_id = project.id.as_str();

        self.checkpoint(project_id, OP_PRD, 30, "Writing your PRD").await?;
        let content = self.generator.generate_prd(context).await?;

        self.checkpoint(project_id, OP_PRD, 90, "Saving your PRD").await?;

        // Save and charge commit together. If another project spent the last
        // credit meanwhile, the decrement fails and the PRD is rolled back.
        let mut tx = self.db.begin().await?;
        let prd = save_prd_on(&mut tx, project_id, &content).await?;
        set_status_on(&mut tx, project_id, ProjectStatus::Completed).await?;
        let remaining = UserStorage::decrement_credits(&mut tx, user_id).await?;
        UserStorage::increment_prds_generated(&mut tx, user_id).await?;
        tx.commit().await?;

        info!(project_id, version = prd.version, credits_remaining = remaining, "PRD generated");
        Ok(prd)
    }

    /// Take the lease and publish the first progress record
    async fn begin(&self, project_id: &str, operation: &str, message: &str) -> Result<LeaseGuard> {
        let guard = self.lease.try_acquire(project_id, operation).await?;

        if let Err(e) = self.progress.set(project_id, operation, 5, message).await {
            if let Err(release_err) = self.lease.release(guard).await {
                warn!(project_id, "Failed to release lease: {}", release_err);
            }
            return Err(e);
        }
        Ok(guard)
    }

    async fn checkpoint(&self, project_id: &str, operation: &str, progress: i32, message: &str) -> Result<()> {
        self.progress.set(project_id, operation, progress, message).await?;
        Ok(())
    }

    /// Clear progress and release the lease whatever the outcome was
    async fn finish<T>(&self, guard: LeaseGuard, outcome: Result<T>) -> Result<T> {
        let project_id = guard.project_id.clone();
        let operation = guard.operation.clone();

        if let Err(e) = self.progress.clear(&project_id).await {
            warn!(project_id = %project_id, "Failed to clear generation progress: {}", e);
        }
        if let Err(e) = self.lease.release(guard).await {
            warn!(project_id = %project_id, "Failed to release generation lease: {}", e);
        }

        if let Err(e) = &outcome {
            error!(project_id = %project_id, operation = %operation, "Generation failed: {}", e);
        }
        outcome
    }
}
