// ABOUTME: Stage policy for the five-step wizard
// ABOUTME: Maps a reset target to the artifacts it purges and the status it lands on

use serde::{Deserialize, Serialize};

use crate::error::{Result, WizardError};
use crate::types::ProjectStatus;

/// Wizard stages in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input = 1,
    Questions = 2,
    TechStack = 3,
    Validation = 4,
    Prd = 5,
}

/// Persisted artifact types, one row per project each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    QuestionSet,
    TechStack,
    Compatibility,
    Prd,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::QuestionSet,
        ArtifactKind::TechStack,
        ArtifactKind::Compatibility,
        ArtifactKind::Prd,
    ];

    pub fn table(self) -> &'static str {
        match self {
            ArtifactKind::QuestionSet => "question_sets",
            ArtifactKind::TechStack => "tech_stack_recommendations",
            ArtifactKind::Compatibility => "compatibility_checks",
            ArtifactKind::Prd => "prds",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::QuestionSet => write!(f, "question set"),
            ArtifactKind::TechStack => write!(f, "tech stack recommendation"),
            ArtifactKind::Compatibility => write!(f, "compatibility check"),
            ArtifactKind::Prd => write!(f, "PRD"),
        }
    }
}

impl Stage {
    /// Interpret the stage number a user asked to go back to.
    ///
    /// Anything at or below 1 means "start over"; the PRD stage has nothing
    /// downstream, so resetting to it is rejected.
    pub fn from_reset_target(target: i64) -> Result<Stage> {
        match target {
            t if t <= 1 => Ok(Stage::Input),
            2 => Ok(Stage::Questions),
            3 => Ok(Stage::TechStack),
            4 => Ok(Stage::Validation),
            t => Err(WizardError::validation(format!(
                "Cannot reset to stage {}; valid targets are 1-4",
                t
            ))),
        }
    }

    /// Artifacts that become stale when the user returns to this stage
    pub fn purged_artifacts(self) -> &'static [ArtifactKind] {
        match self {
            Stage::Input => &[
                ArtifactKind::QuestionSet,
                ArtifactKind::TechStack,
                ArtifactKind::Compatibility,
                ArtifactKind::Prd,
            ],
            Stage::Questions => &[
                ArtifactKind::TechStack,
                ArtifactKind::Compatibility,
                ArtifactKind::Prd,
            ],
            Stage::TechStack => &[ArtifactKind::Compatibility, ArtifactKind::Prd],
            Stage::Validation => &[ArtifactKind::Prd],
            Stage::Prd => &[],
        }
    }

    /// Status and step a project lands on after resetting to this stage
    pub fn reset_status(self) -> (ProjectStatus, i64) {
        let status = match self {
            Stage::Input => ProjectStatus::Draft,
            Stage::Questions => ProjectStatus::Questions,
            Stage::TechStack => ProjectStatus::Research,
            Stage::Validation => ProjectStatus::Validation,
            Stage::Prd => ProjectStatus::Completed,
        };
        (status, status.step())
    }

    pub fn number(self) -> i64 {
        self as i64
    }
}
