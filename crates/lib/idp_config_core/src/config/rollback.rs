// @awa-component: CFG-RollbackEngine
//
//! Rollback: re-append a historical config as a new version.

use tracing::{info, warn};

use super::store::{VersionStore, WriteContext};
use super::{ConfigError, EnvKey};
use crate::models::version::{Version, rollback_author};

/// Re-apply the config of `target_version` as a new, higher version.
///
/// The historical config is checked against the rules in force now, not
/// the rules it was written under. Rolling back to the current version is
/// allowed and still appends.
pub async fn rollback(
    store: &VersionStore,
    key: &EnvKey,
    target_version: u64,
    ctx: &WriteContext,
) -> Result<Version, ConfigError> {
    let historical = store.version(key, target_version).await?;

    let result = store
        .validate_environment(&key.environment, &historical.config)
        .await;
    if !result.valid {
        warn!(
            key = %key,
            version = target_version,
            errors = %result.summary(),
            "rollback target no longer valid"
        );
        return Err(ConfigError::ValidationError(result));
    }

    let version = store
        .put_with(key, historical.config, &rollback_author(target_version), ctx)
        .await?;
    info!(
        key = %key,
        from = target_version,
        version = version.version_number,
        "configuration rolled back"
    );
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ValidationPolicy;
    use crate::models::config::{EnvironmentConfig, ResourceQuantities};
    use crate::models::version::DIRECT_AUTHOR;

    fn env(replicas: u32) -> EnvironmentConfig {
        EnvironmentConfig::new(
            replicas,
            ResourceQuantities::new("100m", "128Mi"),
            ResourceQuantities::new("500m", "512Mi"),
        )
    }

    fn key() -> EnvKey {
        EnvKey::new("orders", "team-a", "staging")
    }

    #[tokio::test]
    async fn rollback_appends_historical_config() {
        let store = VersionStore::default();
        store.put(&key(), env(1), DIRECT_AUTHOR).await.unwrap();
        store.put(&key(), env(3), DIRECT_AUTHOR).await.unwrap();

        let v = rollback(&store, &key(), 1, &WriteContext::default()).await.unwrap();
        assert_eq!(v.version_number, 3);
        assert_eq!(v.author, "rollback:v1");
        assert_eq!(store.get(&key()).await.unwrap().replicas, 1);
    }

    #[tokio::test]
    async fn rollback_to_current_still_records_a_version() {
        let store = VersionStore::default();
        store.put(&key(), env(2), DIRECT_AUTHOR).await.unwrap();
        let current = store.get(&key()).await.unwrap();

        let v = rollback(&store, &key(), 1, &WriteContext::default()).await.unwrap();
        assert_eq!(v.version_number, 2);
        assert_eq!(v.config, current);
        assert_eq!(store.history(&key()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_version_is_version_not_found() {
        let store = VersionStore::default();
        store.put(&key(), env(1), DIRECT_AUTHOR).await.unwrap();
        let err = rollback(&store, &key(), 7, &WriteContext::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionNotFound { ref environment, version: 7 } if environment == "staging"
        ));
        assert_eq!(store.history(&key()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rollback_revalidates_under_current_policy() {
        let store = VersionStore::default();
        store.put(&key(), env(10), DIRECT_AUTHOR).await.unwrap();
        store.put(&key(), env(2), DIRECT_AUTHOR).await.unwrap();
        store
            .set_policy(ValidationPolicy {
                max_replicas: 5,
                ..ValidationPolicy::default()
            })
            .await;

        let err = rollback(&store, &key(), 1, &WriteContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref r) if !r.valid));
        assert_eq!(store.history(&key()).await.unwrap().len(), 2);
    }
}
