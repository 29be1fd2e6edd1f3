// @awa-component: CFG-ConfigResolver
//
//! Effective configuration resolution: environment config + record global
//! block, with the global block falling back to defaults.

use serde::Serialize;

use super::store::VersionStore;
use super::{ConfigError, EnvKey};
use crate::models::config::{ConfigurationRecord, EnvironmentConfig, GlobalConfig};

/// Everything an operator needs to see about one environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub application: String,
    pub namespace: String,
    pub environment: String,
    pub config: EnvironmentConfig,
    pub global: GlobalConfig,
}

/// The record's global block, or the defaults when it has none.
pub fn resolve_global(record: &ConfigurationRecord) -> GlobalConfig {
    record.global.clone().unwrap_or_default()
}

/// Resolve one environment of an in-memory record.
pub fn resolve_effective(
    record: &ConfigurationRecord,
    environment: &str,
) -> Result<EffectiveConfig, ConfigError> {
    let config = record.environments.get(environment).ok_or_else(|| {
        ConfigError::NotFound(format!(
            "{}/{}/{environment}",
            record.namespace, record.application
        ))
    })?;

    Ok(EffectiveConfig {
        application: record.application.clone(),
        namespace: record.namespace.clone(),
        environment: environment.to_string(),
        config: config.clone(),
        global: resolve_global(record),
    })
}

/// Resolve every environment of a record, in environment-name order.
pub fn resolve_all(record: &ConfigurationRecord) -> Vec<EffectiveConfig> {
    record
        .environments
        .iter()
        .map(|(environment, config)| EffectiveConfig {
            application: record.application.clone(),
            namespace: record.namespace.clone(),
            environment: environment.clone(),
            config: config.clone(),
            global: resolve_global(record),
        })
        .collect()
}

/// Resolve the current config of a stored environment.
pub async fn get_effective_config(
    store: &VersionStore,
    key: &EnvKey,
) -> Result<EffectiveConfig, ConfigError> {
    let record = store.get_record(&key.record()).await?;
    resolve_effective(&record, &key.environment)
        .map_err(|_| ConfigError::NotFound(key.to_string()))
}
