// @awa-component: CFG-RecordService
//
//! Whole-record operations built on the per-environment store.

use tracing::{info, warn};

use super::store::{RecordMeta, VersionStore, WriteContext};
use super::templates::TemplateCatalog;
use super::validation::ValidationResult;
use super::{ConfigError, EnvKey, RecordKey};
use crate::models::config::{ConfigurationRecord, EnvironmentConfig};
use crate::models::version::{DIRECT_AUTHOR, Version, template_author};

/// Create a record from scratch.
///
/// The whole record is validated before anything is written. Every
/// environment lands as version 1.
pub async fn create_record(
    store: &VersionStore,
    record: ConfigurationRecord,
    ctx: &WriteContext,
) -> Result<ConfigurationRecord, ConfigError> {
    create_with_author(store, record, DIRECT_AUTHOR, ctx).await
}

/// Replace a record's metadata and append a version for every environment
/// whose config differs from its current one.
///
/// Environments absent from `record` keep their history untouched.
pub async fn update_record(
    store: &VersionStore,
    record: ConfigurationRecord,
    ctx: &WriteContext,
) -> Result<ConfigurationRecord, ConfigError> {
    let key = RecordKey::new(record.application.clone(), record.namespace.clone());
    if !store.exists(&key) {
        return Err(ConfigError::NotFound(key.to_string()));
    }
    ensure_valid(store, &key, &record).await?;

    let meta = RecordMeta {
        global: record.global,
        labels: record.labels,
    };
    let written = store
        .update(&key, meta, record.environments, DIRECT_AUTHOR, ctx)
        .await?;

    info!(
        app = %key.application,
        namespace = %key.namespace,
        versions = written.len(),
        "configuration updated"
    );
    store.get_record(&key).await
}

pub async fn get_record(
    store: &VersionStore,
    application: &str,
    namespace: &str,
) -> Result<ConfigurationRecord, ConfigError> {
    store.get_record(&RecordKey::new(application, namespace)).await
}

/// Every record, optionally filtered by namespace, ordered by namespace
/// then application.
pub async fn list_records(store: &VersionStore, namespace: Option<&str>) -> Vec<ConfigurationRecord> {
    store.list(namespace).await
}

/// Remove a record and its history. Deleting an absent record succeeds.
pub async fn delete_record(store: &VersionStore, application: &str, namespace: &str) {
    store.delete(&RecordKey::new(application, namespace)).await;
}

/// Direct update of one environment.
pub async fn put_environment(
    store: &VersionStore,
    key: &EnvKey,
    config: EnvironmentConfig,
    ctx: &WriteContext,
) -> Result<Version, ConfigError> {
    store.put_with(key, config, DIRECT_AUTHOR, ctx).await
}

/// Seed a record from a template, optionally persisting it.
///
/// Persisting never touches an existing record; it fails with
/// [`ConfigError::AlreadyExists`] instead.
pub async fn apply_template(
    store: &VersionStore,
    catalog: &TemplateCatalog,
    template: &str,
    application: &str,
    namespace: &str,
    persist: bool,
    ctx: &WriteContext,
) -> Result<ConfigurationRecord, ConfigError> {
    let record = catalog.apply(template, application, namespace)?;
    if !persist {
        return Ok(record);
    }
    create_with_author(store, record, &template_author(template), ctx).await
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

async fn create_with_author(
    store: &VersionStore,
    record: ConfigurationRecord,
    author: &str,
    ctx: &WriteContext,
) -> Result<ConfigurationRecord, ConfigError> {
    let key = RecordKey::new(record.application.clone(), record.namespace.clone());
    ensure_valid(store, &key, &record).await?;

    // A concurrent create of the same record fails with AlreadyExists
    // rather than appending version 2.
    let meta = RecordMeta {
        global: record.global,
        labels: record.labels,
    };
    store
        .create(&key, meta, record.environments, author, ctx)
        .await?;

    info!(
        app = %key.application,
        namespace = %key.namespace,
        author,
        "configuration created"
    );
    store.get_record(&key).await
}

async fn ensure_valid(
    store: &VersionStore,
    key: &RecordKey,
    record: &ConfigurationRecord,
) -> Result<ValidationResult, ConfigError> {
    let result = store.validate_record(record).await;
    if !result.valid {
        warn!(record = %key, errors = %result.summary(), "record rejected");
        return Err(ConfigError::ValidationError(result));
    }
    Ok(result)
}
