// ABOUTME: Content generation seam between the wizard and the LLM providers
// ABOUTME: ContentGenerator trait plus the Anthropic/Perplexity-backed implementation

use async_trait::async_trait;
use juststart_ai::{AIService, ResearchClient};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, WizardError};
use crate::prompts;
use crate::types::*;

/// Produces the content of each wizard stage
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_questions(&self, project: &Project) -> Result<Vec<Question>>;

    async fn research_tech_stack(
        &self,
        project: &Project,
        questions: &QuestionSet,
    ) -> Result<TechStackResearch>;

    async fn validate_compatibility(
        &self,
        project: &Project,
        stack: &StackSelection,
    ) -> Result<CompatibilityReport>;

    async fn generate_prd(&self, context: PrdContext<'_>) -> Result<PrdContent>;
}

#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    questions: Vec<Question>,
}

/// Generator backed by Claude for structured output and Perplexity for web research
pub struct AiContentGenerator {
    ai: AIService,
    research: ResearchClient,
}

impl AiContentGenerator {
    pub fn new(ai: AIService, research: ResearchClient) -> Self {
        Self { ai, research }
    }
}

#[async_trait]
impl ContentGenerator for AiContentGenerator {
    async fn generate_questions(&self, project: &Project) -> Result<Vec<Question>> {
        let response = self
            .ai
            .generate_structured::<QuestionsEnvelope>(
                &prompts::questions_prompt(project),
                Some(prompts::SYSTEM_PROMPT),
            )
            .await?;

        info!(
            project_id = %project.id,
            tokens = response.usage.total_tokens(),
            count = response.data.questions.len(),
            "Generated questions"
        );

        if response.data.questions.is_empty() {
            return Err(WizardError::Upstream(juststart_ai::AIServiceError::InvalidResponse));
        }
        Ok(response.data.questions)
    }

    async fn research_tech_stack(
        &self,
        project: &Project,
        questions: &QuestionSet,
    ) -> Result<TechStackResearch> {
        let answers = questions.answers.clone().unwrap_or_default();
        let research_queries = prompts::research_queries(project, &answers);

        let mut sections = Vec::with_capacity(research_queries.len());
        for query in &research_queries {
            let answer = self
                .research
                .search(query, prompts::RESEARCH_SYSTEM_PROMPT)
                .await?;
            let mut section = format!("### {}\n\n{}", query, answer.content.trim());
            if !answer.citations.is_empty() {
                section.push_str("\n\nSources:\n");
                for citation in &answer.citations {
                    section.push_str(&format!("- {}\n", citation));
                }
            }
            sections.push(section);
        }
        let research_results = sections.join("\n\n");

        let response = self
            .ai
            .generate_structured::<StackRecommendations>(
                &prompts::recommendations_prompt(project, questions, &research_results),
                Some(prompts::SYSTEM_PROMPT),
            )
            .await?;

        info!(
            project_id = %project.id,
            tokens = response.usage.total_tokens(),
            queries = research_queries.len(),
            "Researched tech stack"
        );

        Ok(TechStackResearch {
            research_queries,
            research_results,
            recommendations: response.data,
        })
    }

    async fn validate_compatibility(
        &self,
        project: &Project,
        stack: &StackSelection,
    ) -> Result<CompatibilityReport> {
        let response = self
            .ai
            .generate_structured::<CompatibilityReport>(
                &prompts::compatibility_prompt(project, stack),
                Some(prompts::SYSTEM_PROMPT),
            )
            .await?;

        let mut report = response.data;
        // A model that lists critical issues under a softer status is overruled
        if report.status != CompatibilityStatus::Critical
            && report
                .issues
                .iter()
                .any(|i| i.severity == IssueSeverity::Critical)
        {
            warn!(project_id = %project.id, "Critical issue reported under non-critical status");
            report.status = CompatibilityStatus::Critical;
        }

        info!(
            project_id = %project.id,
            tokens = response.usage.total_tokens(),
            status = ?report.status,
            "Validated compatibility"
        );
        Ok(report)
    }

    async fn generate_prd(&self, context: PrdContext<'_>) -> Result<PrdContent> {
        let stack = context
            .stack
            .confirmed_stack
            .clone()
            .unwrap_or_else(|| context.stack.recommendations.default_selection());

        let response = self
            .ai
            .generate_structured::<PrdContent>(
                &prompts::prd_prompt(context.project, context.questions, &stack, context.compatibility),
                Some(prompts::SYSTEM_PROMPT),
            )
            .await?;

        info!(
            project_id = %context.project.id,
            tokens = response.usage.total_tokens(),
            "Generated PRD"
        );
        Ok(response.data)
    }
}
