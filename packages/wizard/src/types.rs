// ABOUTME: Type definitions for the PRD wizard
// ABOUTME: Projects, stage artifacts, generation progress, and request inputs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a project sits in the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Created, nothing generated yet
    Draft,
    /// Clarifying questions generated, waiting for answers
    Questions,
    /// Answers in, tech stack research next
    Research,
    /// Stack recommended, waiting for the user to lock it in
    Confirmation,
    /// Stack confirmed, compatibility check and PRD next
    Validation,
    /// PRD generated
    Completed,
}

impl ProjectStatus {
    /// Wizard step shown for this status
    pub fn step(self) -> i64 {
        match self {
            ProjectStatus::Draft => 1,
            ProjectStatus::Questions => 2,
            ProjectStatus::Research | ProjectStatus::Confirmation => 3,
            ProjectStatus::Validation => 4,
            ProjectStatus::Completed => 5,
        }
    }
}

/// Transient UI feedback for a running generation action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProgress {
    pub stage: String,
    pub progress: u8,
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub app_name: String,
    pub app_description: String,
    pub status: ProjectStatus,
    pub current_step: i64,
    pub generation_progress: Option<GenerationProgress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub app_name: String,
    pub app_description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub app_name: Option<String>,
    pub app_description: Option<String>,
}

// ---------------------------------------------------------------------------
// Stage 2: clarifying questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub default_answer: String,
    pub category: String,
}

/// Question id -> chosen option or free-text answer
pub type Answers = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    pub id: String,
    pub project_id: String,
    pub questions: Vec<Question>,
    pub answers: Option<Answers>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionSet {
    pub fn is_answered(&self) -> bool {
        self.answers.is_some()
    }
}

// ---------------------------------------------------------------------------
// Stage 3: tech stack research
// ---------------------------------------------------------------------------

/// Categories every recommendation and confirmed selection must cover
pub const TECH_CATEGORIES: [&str; 5] = ["frontend", "backend", "database", "auth", "hosting"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechChoice {
    pub technology: String,
    pub reasoning: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackRecommendations {
    pub frontend: TechChoice,
    pub backend: TechChoice,
    pub database: TechChoice,
    pub auth: TechChoice,
    pub hosting: TechChoice,
}

impl StackRecommendations {
    pub fn get(&self, category: &str) -> Option<&TechChoice> {
        match category {
            "frontend" => Some(&self.frontend),
            "backend" => Some(&self.backend),
            "database" => Some(&self.database),
            "auth" => Some(&self.auth),
            "hosting" => Some(&self.hosting),
            _ => None,
        }
    }

    /// Selection that takes the recommended technology in every category
    pub fn default_selection(&self) -> StackSelection {
        TECH_CATEGORIES
            .iter()
            .filter_map(|c| self.get(c).map(|choice| (c.to_string(), choice.technology.clone())))
            .collect()
    }
}

/// Category -> chosen technology
pub type StackSelection = BTreeMap<String, String>;

/// Output of the research step, before it is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStackResearch {
    pub research_queries: Vec<String>,
    pub research_results: String,
    pub recommendations: StackRecommendations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStackRecommendation {
    pub id: String,
    pub project_id: String,
    pub research_queries: Vec<String>,
    pub research_results: String,
    pub recommendations: StackRecommendations,
    pub confirmed_stack: Option<StackSelection>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Stage 4: compatibility validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityStatus {
    Approved,
    Warnings,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    Moderate,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityIssue {
    pub severity: IssueSeverity,
    pub component: String,
    pub issue: String,
    pub recommendation: String,
}

/// Output of the validation step, before it is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub status: CompatibilityStatus,
    #[serde(default)]
    pub issues: Vec<CompatibilityIssue>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityCheck {
    pub id: String,
    pub project_id: String,
    pub status: CompatibilityStatus,
    pub issues: Vec<CompatibilityIssue>,
    pub summary: String,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompatibilityCheck {
    /// Whether the PRD stage may run on top of this check
    pub fn allows_prd(&self) -> bool {
        match self.status {
            CompatibilityStatus::Approved => true,
            CompatibilityStatus::Warnings => self.acknowledged_at.is_some(),
            CompatibilityStatus::Critical => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 5: PRD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub needs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdTechEntry {
    pub category: String,
    pub technology: String,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdFeature {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Structured PRD document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrdContent {
    pub overview: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(default)]
    pub tech_stack: Vec<PrdTechEntry>,
    #[serde(default)]
    pub features: Vec<PrdFeature>,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub ui_ux: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prd {
    pub id: String,
    pub project_id: String,
    pub content: PrdContent,
    pub version: i64,
    pub generated_at: DateTime<Utc>,
    pub exported_at: Option<DateTime<Utc>>,
    pub share_token: Option<String>,
    pub share_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What an anonymous share-link holder gets to see
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedPrd {
    pub app_name: String,
    pub content: PrdContent,
    pub version: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Everything the generator needs to know about a project when writing the PRD
#[derive(Debug, Clone)]
pub struct PrdContext<'a> {
    pub project: &'a Project,
    pub questions: &'a QuestionSet,
    pub stack: &'a TechStackRecommendation,
    pub compatibility: &'a CompatibilityCheck,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_steps() {
        assert_eq!(ProjectStatus::Draft.step(), 1);
        assert_eq!(ProjectStatus::Questions.step(), 2);
        assert_eq!(ProjectStatus::Research.step(), 3);
        assert_eq!(ProjectStatus::Confirmation.step(), 3);
        assert_eq!(ProjectStatus::Validation.step(), 4);
        assert_eq!(ProjectStatus::Completed.step(), 5);
    }

    #[test]
    fn test_prd_content_tolerates_missing_sections() {
        let content: PrdContent =
            serde_json::from_str(r#"{"overview": "A todo app"}"#).unwrap();
        assert_eq!(content.overview, "A todo app");
        assert!(content.features.is_empty());
        assert_eq!(content.ui_ux, "");
    }
}
