// ABOUTME: Ownership checks between an identity and a project
// ABOUTME: Reads hide foreign projects as absent, mutations reject them as forbidden

use juststart_security::{Identity, User, UserStorage};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{Result, WizardError};
use crate::manager::fetch_project;
use crate::types::Project;

pub struct Access {
    pool: SqlitePool,
    users: UserStorage,
}

impl Access {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserStorage::new(pool.clone()),
            pool,
        }
    }

    /// Local user for the caller. Unknown identities are unauthenticated.
    pub async fn resolve_user(&self, identity: &Identity) -> Result<User> {
        self.users
            .resolve(identity)
            .await?
            .ok_or(WizardError::Unauthenticated)
    }

    /// Project visible to the caller, or `None` when it is missing or someone else's
    pub async fn authorize_read(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<Option<(User, Project)>> {
        let user = self.resolve_user(identity).await?;

        match fetch_project(&self.pool, project_id).await? {
            Some(project) if project.user_id == user.id => Ok(Some((user, project))),
            Some(_) => {
                debug!(project_id, user_id = %user.id, "Read of foreign project hidden");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Project the caller may modify. Missing and foreign projects are both `Forbidden`.
    pub async fn authorize_mutation(
        &self,
        identity: &Identity,
        project_id: &str,
    ) -> Result<(User, Project)> {
        let user = self.resolve_user(identity).await?;

        match fetch_project(&self.pool, project_id).await? {
            Some(project) if project.user_id == user.id => Ok((user, project)),
            _ => {
                warn!(project_id, user_id = %user.id, "Mutation on unowned project rejected");
                Err(WizardError::Forbidden)
            }
        }
    }
}
