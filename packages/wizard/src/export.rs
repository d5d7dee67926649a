// ABOUTME: Markdown export of a generated PRD
// ABOUTME: Renders the structured content and records when the user exported it

use chrono::Utc;
use juststart_security::Identity;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::access::Access;
use crate::artifacts::ArtifactStore;
use crate::error::{Result, WizardError};
use crate::types::Prd;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPrd {
    pub file_name: String,
    pub markdown: String,
    pub version: i64,
}

pub struct Exporter {
    db: SqlitePool,
    access: Access,
    artifacts: ArtifactStore,
}

impl Exporter {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            access: Access::new(db.clone()),
            artifacts: ArtifactStore::new(db.clone()),
            db,
        }
    }

    pub async fn export_prd(&self, identity: &Identity, project_id: &str) -> Result<ExportedPrd> {
        let (_, project) = self.access.authorize_mutation(identity, project_id).await?;
        let prd = self
            .artifacts
            .get_prd(project_id)
            .await?
            .ok_or_else(|| WizardError::missing("PRD"))?;

        let markdown = render_markdown(&project.app_name, &prd);

        sqlx::query("UPDATE prds SET exported_at = $1 WHERE project_id = $2")
            .bind(Utc::now())
            .bind(project_id)
            .execute(&self.db)
            .await?;

        info!(project_id, version = prd.version, "Exported PRD as Markdown");
        Ok(ExportedPrd {
            file_name: file_name_for(&project.app_name),
            markdown,
            version: prd.version,
        })
    }
}

/// Render a PRD as a standalone Markdown document
pub fn render_markdown(app_name: &str, prd: &Prd) -> String {
    let content = &prd.content;
    let mut md = String::new();

    md.push_str(&format!("# {} - Product Requirements Document\n\n", app_name));
    md.push_str(&format!(
        "_Version {} - generated {}_\n\n",
        prd.version,
        prd.generated_at.format("%Y-%m-%d")
    ));

    md.push_str("## Overview\n\n");
    md.push_str(content.overview.trim());
    md.push_str("\n\n");

    if !content.goals.is_empty() {
        md.push_str("## Goals\n\n");
        for goal in &content.goals {
            md.push_str(&format!("- {}\n", goal));
        }
        md.push('\n');
    }

    if !content.personas.is_empty() {
        md.push_str("## Personas\n\n");
        for persona in &content.personas {
            md.push_str(&format!("### {}\n\n{}\n\n", persona.name, persona.description));
            for need in &persona.needs {
                md.push_str(&format!("- {}\n", need));
            }
            if !persona.needs.is_empty() {
                md.push('\n');
            }
        }
    }

    if !content.tech_stack.is_empty() {
        md.push_str("## Tech Stack\n\n| Category | Technology | Rationale |\n|---|---|---|\n");
        for entry in &content.tech_stack {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                entry.category,
                entry.technology,
                entry.rationale.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    if !content.features.is_empty() {
        md.push_str("## Features\n\n");
        for feature in &content.features {
            match &feature.priority {
                Some(priority) => {
                    md.push_str(&format!("### {} ({})\n\n", feature.name, priority))
                }
                None => md.push_str(&format!("### {}\n\n", feature.name)),
            }
            md.push_str(feature.description.trim());
            md.push_str("\n\n");
        }
    }

    if !content.architecture.trim().is_empty() {
        md.push_str("## Architecture\n\n");
        md.push_str(content.architecture.trim());
        md.push_str("\n\n");
    }

    if !content.ui_ux.trim().is_empty() {
        md.push_str("## UI/UX\n\n");
        md.push_str(content.ui_ux.trim());
        md.push_str("\n\n");
    }

    md.trim_end().to_string() + "\n"
}

fn file_name_for(app_name: &str) -> String {
    let slug: String = app_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "prd.md".to_string()
    } else {
        format!("{}-prd.md", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrdContent, PrdFeature, PrdTechEntry};

    fn prd() -> Prd {
        let now = Utc::now();
        Prd {
            id: "prd00001".into(),
            project_id: "proj0001".into(),
            content: PrdContent {
                overview: "Track shared groceries.".into(),
                goals: vec!["Never buy milk twice".into()],
                personas: vec![],
                tech_stack: vec![PrdTechEntry {
                    category: "database".into(),
                    technology: "SQLite".into(),
                    rationale: "Small | simple".into(),
                }],
                features: vec![PrdFeature {
                    name: "Shared list".into(),
                    description: "Everyone sees the same list.".into(),
                    priority: Some("must".into()),
                }],
                architecture: String::new(),
                ui_ux: "Mobile first.".into(),
            },
            version: 2,
            generated_at: now,
            exported_at: None,
            share_token: None,
            share_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_render_markdown_sections() {
        let md = render_markdown("Groceries", &prd());

        assert!(md.starts_with("# Groceries - Product Requirements Document\n"));
        assert!(md.contains("_Version 2 - generated "));
        assert!(md.contains("## Goals\n\n- Never buy milk twice\n"));
        assert!(md.contains("| database | SQLite | Small \\| simple |"));
        assert!(md.contains("### Shared list (must)"));
        assert!(md.contains("## UI/UX\n\nMobile first.\n"));
        // Empty sections are omitted
        assert!(!md.contains("## Architecture"));
        assert!(!md.contains("## Personas"));
    }

    #[test]
    fn test_file_name_slug() {
        assert_eq!(file_name_for("Groceries & Co!"), "groceries-co-prd.md");
        assert_eq!(file_name_for("???"), "prd.md");
    }
}
