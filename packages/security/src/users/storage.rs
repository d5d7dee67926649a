// ABOUTME: User storage layer using SQLite
// ABOUTME: Identity upserts, lookups, and the per-user credit gate

use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::types::{IdentityProfile, Subscription, SubscriptionDefaults, User, UserError, UserResult};
use crate::identity::Identity;
use juststart_storage::StorageError;

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: &str) -> UserResult<User> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))?;

        row_to_user(&row)
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> UserResult<Option<User>> {
        debug!("Fetching user by external id: {}", external_id);

        let row = sqlx::query("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Map the caller's identity to its local user record
    pub async fn resolve(&self, identity: &Identity) -> UserResult<Option<User>> {
        self.find_by_external_id(&identity.subject).await
    }

    /// Insert a user seen for the first time, or refresh profile fields of a known one.
    ///
    /// Subscription defaults only apply on insert; an existing balance is never touched.
    pub async fn upsert_from_identity(
        &self,
        profile: &IdentityProfile,
        defaults: &SubscriptionDefaults,
    ) -> UserResult<User> {
        debug!("Upserting user for external id: {}", profile.external_id);

        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, external_id, email, name, subscription_tier, credits, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(external_id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(juststart_core::generate_id())
        .bind(&profile.external_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&defaults.tier)
        .bind(defaults.credits)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_user(&row)
    }

    /// Delete the user mirrored from `external_id`; projects and artifacts cascade.
    /// Returns whether a row was removed.
    pub async fn delete_by_external_id(&self, external_id: &str) -> UserResult<bool> {
        debug!("Deleting user by external id: {}", external_id);

        let result = sqlx::query("DELETE FROM users WHERE external_id = ?")
            .bind(external_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Consume one credit on a caller-owned connection or transaction, so the
    /// charge commits or rolls back with the caller's other writes.
    ///
    /// Fails without mutating when the balance is already zero. Returns the
    /// remaining balance.
    pub async fn decrement_credits(conn: &mut SqliteConnection, user_id: &str) -> UserResult<i64> {
        debug!("Decrementing credits for user: {}", user_id);

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET credits = credits - 1, updated_at = ?
            WHERE id = ? AND credits > 0
            RETURNING credits
            "#,
        )
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

        if let Some(credits) = remaining {
            info!(user_id = %user_id, credits, "Credit consumed");
            return Ok(credits);
        }

        // Distinguish an empty balance from a missing user
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StorageError::Sqlx)?;

        match exists {
            Some(_) => Err(UserError::InsufficientCredits(user_id.to_string())),
            None => Err(UserError::NotFound(user_id.to_string())),
        }
    }

    /// Bump the PRD-generated counter on a caller-owned connection or
    /// transaction. Returns the new count.
    pub async fn increment_prds_generated(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> UserResult<i64> {
        debug!("Incrementing PRD counter for user: {}", user_id);

        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET prds_generated = prds_generated + 1, updated_at = ?
            WHERE id = ?
            RETURNING prds_generated
            "#,
        )
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(StorageError::Sqlx)?;

        count.ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> UserResult<User> {
    let map = |e: sqlx::Error| UserError::Storage(StorageError::Sqlx(e));

    Ok(User {
        id: row.try_get("id").map_err(map)?,
        external_id: row.try_get("external_id").map_err(map)?,
        email: row.try_get("email").map_err(map)?,
        name: row.try_get("name").map_err(map)?,
        prds_generated: row.try_get("prds_generated").map_err(map)?,
        subscription: Subscription {
            tier: row.try_get("subscription_tier").map_err(map)?,
            credits: row.try_get("credits").map_err(map)?,
        },
        created_at: row.try_get("created_at").map_err(map)?,
        updated_at: row.try_get("updated_at").map_err(map)?,
    })
}
