// ABOUTME: Integration tests for the wizard workflow against an in-memory database
// ABOUTME: Drives every stage with a deterministic generator and checks stage, credit, and ownership rules

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use juststart_ai::AIServiceError;
use juststart_security::{Identity, IdentityProfile, SubscriptionDefaults, UserStorage};
use juststart_wizard::*;
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;

// ============================================================================
// Fixtures
// ============================================================================

struct StubGenerator {
    compatibility: Mutex<CompatibilityStatus>,
    fail_next: AtomicBool,
    prd_calls: AtomicU32,
}

impl StubGenerator {
    fn new() -> Self {
        Self {
            compatibility: Mutex::new(CompatibilityStatus::Approved),
            fail_next: AtomicBool::new(false),
            prd_calls: AtomicU32::new(0),
        }
    }

    fn set_compatibility(&self, status: CompatibilityStatus) {
        *self.compatibility.lock().unwrap() = status;
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(WizardError::Upstream(AIServiceError::Http {
                status: 503,
                body: "overloaded".into(),
            }));
        }
        Ok(())
    }
}

fn choice(technology: &str) -> TechChoice {
    TechChoice {
        technology: technology.into(),
        reasoning: "Well supported".into(),
        pros: vec!["Popular".into()],
        cons: vec![],
        alternatives: vec![],
    }
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate_questions(&self, _project: &Project) -> Result<Vec<Question>> {
        self.check_failure()?;
        Ok(vec![
            Question {
                id: "audience".into(),
                question: "Who is it for?".into(),
                options: vec!["Consumers".into(), "Teams".into()],
                default_answer: "Consumers".into(),
                category: "audience".into(),
            },
            Question {
                id: "platform".into(),
                question: "Where does it run?".into(),
                options: vec!["Web".into(), "Mobile".into()],
                default_answer: "Web".into(),
                category: "platform".into(),
            },
        ])
    }

    async fn research_tech_stack(
        &self,
        _project: &Project,
        _questions: &QuestionSet,
    ) -> Result<TechStackResearch> {
        self.check_failure()?;
        Ok(TechStackResearch {
            research_queries: vec!["web app stack".into()],
            research_results: "Keep it simple".into(),
            recommendations: StackRecommendations {
                frontend: choice("React"),
                backend: choice("Axum"),
                database: choice("SQLite"),
                auth: choice("Clerk"),
                hosting: choice("Fly.io"),
            },
        })
    }

    async fn validate_compatibility(
        &self,
        _project: &Project,
        _stack: &StackSelection,
    ) -> Result<CompatibilityReport> {
        self.check_failure()?;
        let status = *self.compatibility.lock().unwrap();
        let issues = match status {
            CompatibilityStatus::Approved => vec![],
            CompatibilityStatus::Warnings => vec![CompatibilityIssue {
                severity: IssueSeverity::Moderate,
                component: "hosting".into(),
                issue: "Cold starts".into(),
                recommendation: "Keep one machine warm".into(),
            }],
            CompatibilityStatus::Critical => vec![CompatibilityIssue {
                severity: IssueSeverity::Critical,
                component: "database".into(),
                issue: "No multi-region writes".into(),
                recommendation: "Use Postgres".into(),
            }],
        };
        Ok(CompatibilityReport {
            status,
            issues,
            summary: "Checked".into(),
        })
    }

    async fn generate_prd(&self, context: PrdContext<'_>) -> Result<PrdContent> {
        self.check_failure()?;
        self.prd_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PrdContent {
            overview: format!("{} overview", context.project.app_name),
            goals: vec!["Launch".into()],
            personas: vec![],
            tech_stack: vec![],
            features: vec![],
            architecture: "Monolith".into(),
            ui_ux: String::new(),
        })
    }
}

/// Holds every PRD generation until `parties` of them are in flight together
struct GatedGenerator {
    inner: StubGenerator,
    gate: tokio::sync::Barrier,
}

#[async_trait]
impl ContentGenerator for GatedGenerator {
    async fn generate_questions(&self, project: &Project) -> Result<Vec<Question>> {
        self.inner.generate_questions(project).await
    }

    async fn research_tech_stack(
        &self,
        project: &Project,
        questions: &QuestionSet,
    ) -> Result<TechStackResearch> {
        self.inner.research_tech_stack(project, questions).await
    }

    async fn validate_compatibility(
        &self,
        project: &Project,
        stack: &StackSelection,
    ) -> Result<CompatibilityReport> {
        self.inner.validate_compatibility(project, stack).await
    }

    async fn generate_prd(&self, context: PrdContext<'_>) -> Result<PrdContent> {
        self.gate.wait().await;
        self.inner.generate_prd(context).await
    }
}

struct Harness {
    pool: SqlitePool,
    manager: ProjectManager,
    generation: GenerationService,
    shares: ShareService,
    exporter: Exporter,
    users: UserStorage,
    generator: Arc<StubGenerator>,
    alice: Identity,
    mallory: Identity,
}

async fn harness_with_credits(credits: i64) -> Harness {
    let pool = juststart_storage::connect_in_memory().await.unwrap();
    let users = UserStorage::new(pool.clone());
    let defaults = SubscriptionDefaults {
        tier: "free".into(),
        credits,
    };

    for subject in ["user_alice", "user_mallory"] {
        users
            .upsert_from_identity(
                &IdentityProfile {
                    external_id: subject.into(),
                    email: format!("{}@example.com", subject),
                    name: subject.into(),
                },
                &defaults,
            )
            .await
            .unwrap();
    }

    let generator = Arc::new(StubGenerator::new());
    Harness {
        manager: ProjectManager::new(pool.clone()),
        generation: GenerationService::new(pool.clone(), generator.clone()),
        shares: ShareService::new(pool.clone()),
        exporter: Exporter::new(pool.clone()),
        users,
        generator,
        alice: Identity::new("user_alice"),
        mallory: Identity::new("user_mallory"),
        pool,
    }
}

async fn harness() -> Harness {
    harness_with_credits(1).await
}

impl Harness {
    async fn create(&self) -> Project {
        self.manager
            .create_project(
                &self.alice,
                CreateProjectInput {
                    app_name: "Plant Pal".into(),
                    app_description: "Reminds people to water their plants".into(),
                },
            )
            .await
            .unwrap()
    }

    /// Drive a project up to (but not including) PRD generation
    async fn ready_for_prd(&self) -> Project {
        let project = self.create().await;
        let id = project.id.as_str();

        self.generation.generate_questions(&self.alice, id).await.unwrap();
        self.manager
            .submit_answers(&self.alice, id, Answers::new())
            .await
            .unwrap();
        let rec = self.generation.research_tech_stack(&self.alice, id).await.unwrap();
        self.manager
            .confirm_tech_stack(&self.alice, id, rec.recommendations.default_selection())
            .await
            .unwrap();
        self.generation.validate_compatibility(&self.alice, id).await.unwrap();
        project
    }

    async fn project(&self, id: &str) -> Project {
        self.manager.get_project(&self.alice, id).await.unwrap().unwrap()
    }

    async fn count(&self, table: &str, project_id: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE project_id = ?", table))
            .bind(project_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_full_wizard_flow() {
    let h = harness().await;
    let project = h.create().await;
    let id = project.id.as_str();

    let questions = h.generation.generate_questions(&h.alice, id).await.unwrap();
    assert_eq!(questions.questions.len(), 2);
    let p = h.project(id).await;
    assert_eq!((p.status, p.current_step), (ProjectStatus::Questions, 2));

    let answered = h
        .manager
        .submit_answers(&h.alice, id, Answers::new())
        .await
        .unwrap();
    assert_eq!(answered.answers.unwrap()["platform"], "Web");
    let p = h.project(id).await;
    assert_eq!((p.status, p.current_step), (ProjectStatus::Research, 3));

    let rec = h.generation.research_tech_stack(&h.alice, id).await.unwrap();
    let p = h.project(id).await;
    assert_eq!((p.status, p.current_step), (ProjectStatus::Confirmation, 3));

    h.manager
        .confirm_tech_stack(&h.alice, id, rec.recommendations.default_selection())
        .await
        .unwrap();
    let p = h.project(id).await;
    assert_eq!((p.status, p.current_step), (ProjectStatus::Validation, 4));

    let check = h.generation.validate_compatibility(&h.alice, id).await.unwrap();
    assert_eq!(check.status, CompatibilityStatus::Approved);
    let p = h.project(id).await;
    assert_eq!((p.status, p.current_step), (ProjectStatus::Validation, 4));

    let prd = h.generation.generate_prd(&h.alice, id).await.unwrap();
    assert_eq!(prd.version, 1);
    assert_eq!(prd.content.overview, "Plant Pal overview");

    let p = h.project(id).await;
    assert_eq!((p.status, p.current_step), (ProjectStatus::Completed, 5));
    assert!(p.generation_progress.is_none());

    let user = h.users.find_by_external_id("user_alice").await.unwrap().unwrap();
    assert_eq!(user.subscription.credits, 0);
    assert_eq!(user.prds_generated, 1);
    assert_eq!(h.count("prds", id).await, 1);
}

#[tokio::test]
async fn test_regenerating_prd_bumps_version_on_same_row() {
    let h = harness_with_credits(3).await;
    let project = h.ready_for_prd().await;
    let id = project.id.as_str();

    let first = h.generation.generate_prd(&h.alice, id).await.unwrap();
    let second = h.generation.generate_prd(&h.alice, id).await.unwrap();
    let third = h.generation.generate_prd(&h.alice, id).await.unwrap();

    assert_eq!((first.version, second.version, third.version), (1, 2, 3));
    assert_eq!(third.id, first.id);
    assert_eq!(h.count("prds", id).await, 1);

    let user = h.users.find_by_external_id("user_alice").await.unwrap().unwrap();
    assert_eq!(user.subscription.credits, 0);
    assert_eq!(user.prds_generated, 3);
}

// ============================================================================
// Credit gate
// ============================================================================

#[tokio::test]
async fn test_prd_refused_without_credits() {
    let h = harness_with_credits(0).await;
    let project = h.ready_for_prd().await;

    let err = h.generation.generate_prd(&h.alice, &project.id).await.unwrap_err();
    assert!(matches!(err, WizardError::InsufficientCredits));
    assert_eq!(h.generator.prd_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.count("prds", &project.id).await, 0);

    let user = h.users.find_by_external_id("user_alice").await.unwrap().unwrap();
    assert_eq!(user.subscription.credits, 0);
    assert_eq!(user.prds_generated, 0);
}

#[tokio::test]
async fn test_last_credit_pays_for_one_of_two_concurrent_prds() {
    let h = harness_with_credits(1).await;
    let first = h.ready_for_prd().await;
    let second = h.ready_for_prd().await;

    let gated = GenerationService::new(
        h.pool.clone(),
        Arc::new(GatedGenerator {
            inner: StubGenerator::new(),
            gate: tokio::sync::Barrier::new(2),
        }),
    );

    // Both pass the balance check before either one saves
    let (a, b) = tokio::join!(
        gated.generate_prd(&h.alice, &first.id),
        gated.generate_prd(&h.alice, &second.id),
    );

    let (winner, loser) = match (&a, &b) {
        (Ok(_), Err(_)) => (&first, &second),
        (Err(_), Ok(_)) => (&second, &first),
        other => panic!("expected exactly one PRD to be paid for, got {:?}", other),
    };
    let err = a.err().or(b.err()).unwrap();
    assert!(matches!(err, WizardError::InsufficientCredits));

    assert_eq!(h.count("prds", &winner.id).await, 1);
    assert_eq!(h.count("prds", &loser.id).await, 0);
    assert_eq!(h.project(&winner.id).await.status, ProjectStatus::Completed);
    assert_eq!(h.project(&loser.id).await.status, ProjectStatus::Validation);
    assert_eq!(h.count("generation_leases", &loser.id).await, 0);

    let user = h.users.find_by_external_id("user_alice").await.unwrap().unwrap();
    assert_eq!(user.subscription.credits, 0);
    assert_eq!(user.prds_generated, 1);
}

// ============================================================================
// Compatibility gate
// ============================================================================

#[tokio::test]
async fn test_critical_compatibility_blocks_prd() {
    let h = harness().await;
    h.generator.set_compatibility(CompatibilityStatus::Critical);
    let project = h.ready_for_prd().await;

    let err = h.generation.generate_prd(&h.alice, &project.id).await.unwrap_err();
    assert!(matches!(err, WizardError::CriticalCompatibility));

    // Acknowledging does not unblock a critical check
    h.manager
        .acknowledge_compatibility(&h.alice, &project.id)
        .await
        .unwrap();
    let err = h.generation.generate_prd(&h.alice, &project.id).await.unwrap_err();
    assert!(matches!(err, WizardError::CriticalCompatibility));
}

#[tokio::test]
async fn test_warnings_require_acknowledgement() {
    let h = harness().await;
    h.generator.set_compatibility(CompatibilityStatus::Warnings);
    let project = h.ready_for_prd().await;

    let err = h.generation.generate_prd(&h.alice, &project.id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));

    h.manager
        .acknowledge_compatibility(&h.alice, &project.id)
        .await
        .unwrap();
    let prd = h.generation.generate_prd(&h.alice, &project.id).await.unwrap();
    assert_eq!(prd.version, 1);
}

#[tokio::test]
async fn test_stage_preconditions() {
    let h = harness().await;
    let project = h.create().await;
    let id = project.id.as_str();

    let err = h.generation.research_tech_stack(&h.alice, id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));

    h.generation.generate_questions(&h.alice, id).await.unwrap();
    // Questions exist but are unanswered
    let err = h.generation.research_tech_stack(&h.alice, id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));

    let err = h.generation.validate_compatibility(&h.alice, id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));

    let err = h.generation.generate_prd(&h.alice, id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));
}

// ============================================================================
// Reset cascade
// ============================================================================

#[tokio::test]
async fn test_reset_to_questions_keeps_question_set() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    let id = project.id.as_str();
    h.generation.generate_prd(&h.alice, id).await.unwrap();

    let reset = h
        .manager
        .reset_from_stage(&h.alice, id, Stage::from_reset_target(2).unwrap())
        .await
        .unwrap();
    assert_eq!((reset.status, reset.current_step), (ProjectStatus::Questions, 2));

    assert!(h.manager.get_questions(&h.alice, id).await.unwrap().is_some());
    assert!(h.manager.get_tech_stack(&h.alice, id).await.unwrap().is_none());
    assert!(h.manager.get_compatibility(&h.alice, id).await.unwrap().is_none());
    assert!(h.manager.get_prd(&h.alice, id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_regenerating_questions_drops_stale_downstream_artifacts() {
    let h = harness_with_credits(2).await;
    let project = h.ready_for_prd().await;
    let id = project.id.as_str();
    h.generation.generate_prd(&h.alice, id).await.unwrap();

    h.generation.generate_questions(&h.alice, id).await.unwrap();

    let p = h.project(id).await;
    assert_eq!((p.status, p.current_step), (ProjectStatus::Questions, 2));
    assert!(h.manager.get_tech_stack(&h.alice, id).await.unwrap().is_none());
    assert!(h.manager.get_compatibility(&h.alice, id).await.unwrap().is_none());
    assert!(h.manager.get_prd(&h.alice, id).await.unwrap().is_none());

    // A PRD can no longer be built from the old stack and check
    let err = h.generation.generate_prd(&h.alice, id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));

    let user = h.users.find_by_external_id("user_alice").await.unwrap().unwrap();
    assert_eq!(user.subscription.credits, 1);
}

#[tokio::test]
async fn test_new_research_invalidates_confirmed_stack_and_check() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    let id = project.id.as_str();

    h.generation.research_tech_stack(&h.alice, id).await.unwrap();

    let rec = h.manager.get_tech_stack(&h.alice, id).await.unwrap().unwrap();
    assert!(rec.confirmed_stack.is_none());
    assert!(h.manager.get_compatibility(&h.alice, id).await.unwrap().is_none());
    let err = h.generation.validate_compatibility(&h.alice, id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));
}

#[tokio::test]
async fn test_reset_to_input_clears_everything() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    let id = project.id.as_str();

    let reset = h
        .manager
        .reset_from_stage(&h.alice, id, Stage::from_reset_target(1).unwrap())
        .await
        .unwrap();
    assert_eq!((reset.status, reset.current_step), (ProjectStatus::Draft, 1));
    assert!(reset.generation_progress.is_none());

    for table in [
        "question_sets",
        "tech_stack_recommendations",
        "compatibility_checks",
        "prds",
    ] {
        assert_eq!(h.count(table, id).await, 0, "{} should be empty", table);
    }
}

#[tokio::test]
async fn test_reset_to_validation_only_drops_prd() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    let id = project.id.as_str();
    h.generation.generate_prd(&h.alice, id).await.unwrap();

    h.manager
        .reset_from_stage(&h.alice, id, Stage::Validation)
        .await
        .unwrap();

    assert!(h.manager.get_compatibility(&h.alice, id).await.unwrap().is_some());
    assert!(h.manager.get_prd(&h.alice, id).await.unwrap().is_none());
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
async fn test_foreign_mutations_forbidden_and_reads_absent() {
    let h = harness().await;
    let project = h.ready_for_prd().await;

    for id in [project.id.as_str(), "does-not-exist"] {
        let err = h
            .manager
            .reset_from_stage(&h.mallory, id, Stage::Input)
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Forbidden));

        let err = h.generation.generate_prd(&h.mallory, id).await.unwrap_err();
        assert!(matches!(err, WizardError::Forbidden));

        let err = h.manager.delete_project(&h.mallory, id).await.unwrap_err();
        assert!(matches!(err, WizardError::Forbidden));

        let err = h.shares.create_share_link(&h.mallory, id).await.unwrap_err();
        assert!(matches!(err, WizardError::Forbidden));

        assert!(h.manager.get_project(&h.mallory, id).await.unwrap().is_none());
        assert!(h.manager.get_questions(&h.mallory, id).await.unwrap().is_none());
        assert!(h.manager.get_progress(&h.mallory, id).await.unwrap().is_none());
    }

    // Nothing changed for the owner
    let p = h.project(&project.id).await;
    assert_eq!(p.status, ProjectStatus::Validation);
    assert!(h.manager.list_projects(&h.mallory).await.unwrap().is_empty());
}

// ============================================================================
// Failure cleanup and the generation lease
// ============================================================================

#[tokio::test]
async fn test_failed_generation_clears_progress_and_lease() {
    let h = harness().await;
    let project = h.create().await;
    let id = project.id.as_str();

    h.generator.fail_next.store(true, Ordering::SeqCst);
    let err = h.generation.generate_questions(&h.alice, id).await.unwrap_err();
    assert!(matches!(err, WizardError::Upstream(_)));

    let p = h.project(id).await;
    assert!(p.generation_progress.is_none());
    assert_eq!(p.status, ProjectStatus::Draft);
    assert_eq!(h.count("generation_leases", id).await, 0);

    // Retry works straight away
    h.generation.generate_questions(&h.alice, id).await.unwrap();
}

#[tokio::test]
async fn test_held_lease_rejects_concurrent_generation() {
    let h = harness().await;
    let project = h.create().await;
    let id = project.id.as_str();

    let lease = GenerationLease::new(h.pool.clone());
    let guard = lease.try_acquire(id, "prd").await.unwrap();

    let err = h.generation.generate_questions(&h.alice, id).await.unwrap_err();
    match err {
        WizardError::GenerationInProgress { operation, .. } => assert_eq!(operation, "prd"),
        other => panic!("expected GenerationInProgress, got {:?}", other),
    }

    lease.release(guard).await.unwrap();
    h.generation.generate_questions(&h.alice, id).await.unwrap();
}

#[tokio::test]
async fn test_expired_lease_is_taken_over() {
    let h = harness().await;
    let project = h.create().await;

    let short = GenerationLease::with_ttl(h.pool.clone(), Duration::ZERO);
    let stale = short.try_acquire(&project.id, "questions").await.unwrap();

    let fresh = GenerationLease::new(h.pool.clone())
        .try_acquire(&project.id, "research")
        .await
        .unwrap();
    assert_ne!(fresh.holder, stale.holder);

    // The crashed holder's late release must not drop the new lease
    short.release(stale).await.unwrap();
    assert_eq!(h.count("generation_leases", &project.id).await, 1);
}

#[tokio::test]
async fn test_progress_tracker_clamps_and_clears() {
    let h = harness().await;
    let project = h.create().await;
    let tracker = ProgressTracker::new(h.pool.clone());

    let record = tracker.set(&project.id, "prd", 250, "Almost").await.unwrap();
    assert_eq!(record.progress, 100);
    let record = tracker.set(&project.id, "prd", -5, "Starting").await.unwrap();
    assert_eq!(record.progress, 0);

    let stored = tracker.get(&project.id).await.unwrap().unwrap();
    assert_eq!(stored.message, "Starting");
    assert_eq!(
        h.manager.get_progress(&h.alice, &project.id).await.unwrap(),
        Some(stored)
    );

    tracker.clear(&project.id).await.unwrap();
    assert!(tracker.get(&project.id).await.unwrap().is_none());
}

// ============================================================================
// Sharing and export
// ============================================================================

#[tokio::test]
async fn test_second_share_link_invalidates_first() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    h.generation.generate_prd(&h.alice, &project.id).await.unwrap();

    let first = h.shares.create_share_link(&h.alice, &project.id).await.unwrap();
    assert_eq!(first.token.len(), 43);
    let shared = h.shares.get_shared_prd(&first.token).await.unwrap().unwrap();
    assert_eq!(shared.app_name, "Plant Pal");
    assert_eq!(shared.version, 1);

    let second = h.shares.create_share_link(&h.alice, &project.id).await.unwrap();
    assert_ne!(first.token, second.token);
    assert!(h.shares.get_shared_prd(&first.token).await.unwrap().is_none());
    assert!(h.shares.get_shared_prd(&second.token).await.unwrap().is_some());

    h.shares.revoke_share_link(&h.alice, &project.id).await.unwrap();
    assert!(h.shares.get_shared_prd(&second.token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_share_link_reads_absent() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    h.generation.generate_prd(&h.alice, &project.id).await.unwrap();

    let expired = ShareService::with_ttl(h.pool.clone(), chrono::Duration::seconds(-1));
    let link = expired.create_share_link(&h.alice, &project.id).await.unwrap();
    assert!(h.shares.get_shared_prd(&link.token).await.unwrap().is_none());
    assert!(h.shares.get_shared_prd("unknown-token").await.unwrap().is_none());
}

#[tokio::test]
async fn test_share_requires_prd() {
    let h = harness().await;
    let project = h.create().await;

    let err = h.shares.create_share_link(&h.alice, &project.id).await.unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));
}

#[tokio::test]
async fn test_export_records_timestamp() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    h.generation.generate_prd(&h.alice, &project.id).await.unwrap();

    let exported = h.exporter.export_prd(&h.alice, &project.id).await.unwrap();
    assert_eq!(exported.file_name, "plant-pal-prd.md");
    assert!(exported.markdown.contains("Plant Pal overview"));

    let prd = h.manager.get_prd(&h.alice, &project.id).await.unwrap().unwrap();
    assert!(prd.exported_at.is_some());
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_delete_removes_every_artifact() {
    let h = harness().await;
    let project = h.ready_for_prd().await;
    let id = project.id.clone();
    h.generation.generate_prd(&h.alice, &id).await.unwrap();

    h.manager.delete_project(&h.alice, &id).await.unwrap();

    for table in [
        "question_sets",
        "tech_stack_recommendations",
        "compatibility_checks",
        "prds",
        "generation_leases",
    ] {
        assert_eq!(h.count(table, &id).await, 0, "{} should be empty", table);
    }
    assert!(h.manager.get_project(&h.alice, &id).await.unwrap().is_none());
}
