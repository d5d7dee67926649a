// ABOUTME: Just Start wizard library - the five-stage PRD workflow
// ABOUTME: Stage policy, project lifecycle, artifact stores, generation pipeline, sharing, and export

pub mod access;
pub mod artifacts;
pub mod error;
pub mod export;
pub mod generation;
pub mod generator;
pub mod lease;
pub mod manager;
pub mod progress;
pub mod prompts;
pub mod share;
pub mod stage;
pub mod types;

pub use access::Access;
pub use artifacts::ArtifactStore;
pub use error::{Result, WizardError};
pub use export::{render_markdown, ExportedPrd, Exporter};
pub use generation::GenerationService;
pub use generator::{AiContentGenerator, ContentGenerator};
pub use lease::{GenerationLease, LeaseGuard, DEFAULT_LEASE_TTL};
pub use manager::ProjectManager;
pub use progress::ProgressTracker;
pub use share::{ShareService, DEFAULT_SHARE_TTL_DAYS};
pub use stage::{ArtifactKind, Stage};
pub use types::*;

