// ABOUTME: Tests for user storage layer
// ABOUTME: Verifies identity upserts and the credit gate never goes negative

#[cfg(test)]
mod tests {
    use super::super::storage::UserStorage;
    use super::super::types::{IdentityProfile, SubscriptionDefaults, UserError, UserResult};
    use crate::identity::Identity;
    use pretty_assertions::assert_eq;
    use sqlx::SqlitePool;

    fn profile(external_id: &str) -> IdentityProfile {
        IdentityProfile {
            external_id: external_id.to_string(),
            email: format!("{}@example.com", external_id),
            name: "Test User".to_string(),
        }
    }

    async fn decrement(pool: &SqlitePool, user_id: &str) -> UserResult<i64> {
        let mut conn = pool.acquire().await.unwrap();
        UserStorage::decrement_credits(&mut conn, user_id).await
    }

    async fn increment(pool: &SqlitePool, user_id: &str) -> UserResult<i64> {
        let mut conn = pool.acquire().await.unwrap();
        UserStorage::increment_prds_generated(&mut conn, user_id).await
    }

    async fn setup(credits: i64) -> (SqlitePool, UserStorage, String) {
        let pool = juststart_storage::connect_in_memory().await.unwrap();
        let storage = UserStorage::new(pool.clone());
        let defaults = SubscriptionDefaults {
            tier: "free".to_string(),
            credits,
        };
        let user = storage
            .upsert_from_identity(&profile("user_abc"), &defaults)
            .await
            .unwrap();
        (pool, storage, user.id)
    }

    #[tokio::test]
    async fn test_upsert_creates_user_with_defaults() {
        let (_pool, storage, user_id) = setup(3).await;

        let user = storage.get_user(&user_id).await.unwrap();
        assert_eq!(user.external_id, "user_abc");
        assert_eq!(user.subscription.tier, "free");
        assert_eq!(user.subscription.credits, 3);
        assert_eq!(user.prds_generated, 0);
    }

    #[tokio::test]
    async fn test_upsert_updates_profile_but_keeps_balance() {
        let (pool, storage, user_id) = setup(2).await;
        decrement(&pool, &user_id).await.unwrap();

        let mut updated = profile("user_abc");
        updated.name = "Renamed".to_string();
        let generous = SubscriptionDefaults {
            tier: "pro".to_string(),
            credits: 100,
        };
        let user = storage
            .upsert_from_identity(&updated, &generous)
            .await
            .unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.name, "Renamed");
        assert_eq!(user.subscription.tier, "free");
        assert_eq!(user.subscription.credits, 1);
    }

    #[tokio::test]
    async fn test_resolve_identity() {
        let (_pool, storage, user_id) = setup(1).await;

        let found = storage.resolve(&Identity::new("user_abc")).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user_id));

        let missing = storage.resolve(&Identity::new("user_nobody")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_decrement_at_one_leaves_zero() {
        let (pool, storage, user_id) = setup(1).await;

        let remaining = decrement(&pool, &user_id).await.unwrap();
        assert_eq!(remaining, 0);

        let user = storage.get_user(&user_id).await.unwrap();
        assert_eq!(user.subscription.credits, 0);
    }

    #[tokio::test]
    async fn test_decrement_at_zero_fails_without_mutation() {
        let (pool, storage, user_id) = setup(0).await;

        let err = decrement(&pool, &user_id).await.unwrap_err();
        assert!(matches!(err, UserError::InsufficientCredits(_)));

        let user = storage.get_user(&user_id).await.unwrap();
        assert_eq!(user.subscription.credits, 0);
    }

    #[tokio::test]
    async fn test_decrement_unknown_user_is_not_found() {
        let (pool, _storage, _user_id) = setup(1).await;

        let err = decrement(&pool, "missing-user").await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_increment_prds_generated() {
        let (pool, _storage, user_id) = setup(1).await;

        assert_eq!(increment(&pool, &user_id).await.unwrap(), 1);
        assert_eq!(increment(&pool, &user_id).await.unwrap(), 2);

        let err = increment(&pool, "missing-user").await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_charge_rolls_back_with_its_transaction() {
        let (pool, storage, user_id) = setup(2).await;

        let mut tx = pool.begin().await.unwrap();
        assert_eq!(UserStorage::decrement_credits(&mut tx, &user_id).await.unwrap(), 1);
        assert_eq!(UserStorage::increment_prds_generated(&mut tx, &user_id).await.unwrap(), 1);
        tx.rollback().await.unwrap();

        let user = storage.get_user(&user_id).await.unwrap();
        assert_eq!(user.subscription.credits, 2);
        assert_eq!(user.prds_generated, 0);
    }

    #[tokio::test]
    async fn test_delete_by_external_id() {
        let (_pool, storage, user_id) = setup(1).await;

        assert!(storage.delete_by_external_id("user_abc").await.unwrap());
        assert!(!storage.delete_by_external_id("user_abc").await.unwrap());
        assert!(matches!(
            storage.get_user(&user_id).await,
            Err(UserError::NotFound(_))
        ));
    }
}
