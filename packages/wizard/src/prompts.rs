// ABOUTME: Prompt builders for each generation stage
// ABOUTME: Plain formatting functions; every prompt asks for a single JSON object

use chrono::{Datelike, Utc};

use crate::types::{Answers, CompatibilityCheck, Project, QuestionSet, StackSelection, TECH_CATEGORIES};

pub const SYSTEM_PROMPT: &str = "You are a senior product manager and software architect helping \
a non-technical founder turn an app idea into a buildable plan. Respond with a single JSON object \
and nothing else.";

pub const RESEARCH_SYSTEM_PROMPT: &str = "You are a technology researcher. Give current, concrete \
recommendations with trade-offs and cite sources.";

pub fn questions_prompt(project: &Project) -> String {
    format!(
        r#"App name: {name}
App description:
{description}

Write 5 to 8 clarifying questions that would most change how this app is built.
Cover audience, core features, platform, data, and monetization.
Give each question 2-4 short options and pick a sensible default from them.

Respond as JSON:
{{"questions": [{{"id": "q1", "question": "...", "options": ["..."], "defaultAnswer": "...", "category": "..."}}]}}"#,
        name = project.app_name,
        description = project.app_description,
    )
}

/// Web research queries derived from the project and its answers
pub fn research_queries(project: &Project, answers: &Answers) -> Vec<String> {
    let context = answers.values().cloned().collect::<Vec<_>>().join("; ");
    vec![
        format!(
            "Best frontend and backend frameworks in {} for: {} ({})",
            Utc::now().year(),
            project.app_description,
            context
        ),
        format!(
            "Recommended database and authentication providers for a {} app",
            project.app_name
        ),
        format!(
            "Cost-effective hosting for an early-stage app like: {}",
            project.app_description
        ),
    ]
}

pub fn recommendations_prompt(project: &Project, questions: &QuestionSet, research: &str) -> String {
    format!(
        r#"App name: {name}
App description:
{description}

Clarifying answers:
{answers}

Research notes:
{research}

Recommend one technology for each of: {categories}.
Respond as JSON:
{{"frontend": {{"technology": "...", "reasoning": "...", "pros": ["..."], "cons": ["..."], "alternatives": ["..."]}}, "backend": {{...}}, "database": {{...}}, "auth": {{...}}, "hosting": {{...}}}}"#,
        name = project.app_name,
        description = project.app_description,
        answers = format_answers(questions),
        research = research,
        categories = TECH_CATEGORIES.join(", "),
    )
}

pub fn compatibility_prompt(project: &Project, stack: &StackSelection) -> String {
    format!(
        r#"App: {name} - {description}

Chosen stack:
{stack}

Check these technologies for integration problems, licensing or pricing traps, and gaps.
Use status "approved" when nothing matters, "warnings" for moderate or low issues, and
"critical" only when the stack cannot work as chosen.
Respond as JSON:
{{"status": "approved|warnings|critical", "issues": [{{"severity": "critical|moderate|low", "component": "...", "issue": "...", "recommendation": "..."}}], "summary": "..."}}"#,
        name = project.app_name,
        description = project.app_description,
        stack = format_stack(stack),
    )
}

pub fn prd_prompt(
    project: &Project,
    questions: &QuestionSet,
    stack: &StackSelection,
    compatibility: &CompatibilityCheck,
) -> String {
    format!(
        r#"Write a product requirements document.

App name: {name}
App description:
{description}

Clarifying answers:
{answers}

Confirmed stack:
{stack}

Compatibility notes:
{compatibility}

Respond as JSON:
{{"overview": "...", "goals": ["..."], "personas": [{{"name": "...", "description": "...", "needs": ["..."]}}], "techStack": [{{"category": "...", "technology": "...", "rationale": "..."}}], "features": [{{"name": "...", "description": "...", "priority": "must|should|could"}}], "architecture": "...", "uiUx": "..."}}"#,
        name = project.app_name,
        description = project.app_description,
        answers = format_answers(questions),
        stack = format_stack(stack),
        compatibility = compatibility.summary,
    )
}

fn format_answers(questions: &QuestionSet) -> String {
    let answers = questions.answers.as_ref();
    questions
        .questions
        .iter()
        .map(|q| {
            let answer = answers
                .and_then(|a| a.get(&q.id))
                .unwrap_or(&q.default_answer);
            format!("- {}: {}", q.question, answer)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_stack(stack: &StackSelection) -> String {
    stack
        .iter()
        .map(|(category, technology)| format!("- {}: {}", category, technology))
        .collect::<Vec<_>>()
        .join("\n")
}
