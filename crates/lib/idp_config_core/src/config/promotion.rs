// @awa-component: CFG-PromotionEngine
//
//! Environment promotion: copy the current config of one environment into
//! another as a new version.
//!
//! The source is read without locking. A write to the source between the
//! read and the target append is allowed; promotion carries whatever was
//! current at read time. Only the target key is locked, by the store.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::diff::{ConfigDiff, diff_optional};
use super::store::{VersionStore, WriteContext};
use super::validation::ValidationResult;
use super::{ConfigError, RecordKey};
use crate::models::config::EnvironmentConfig;
use crate::models::version::{Version, promotion_author};

/// What a promotion would do, computed without writing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionPreview {
    pub source_environment: String,
    pub target_environment: String,
    /// Whether the target already has history.
    pub target_exists: bool,
    /// Changes from the target's current config to the source's.
    pub diff: ConfigDiff,
    /// The source config validated under the target's rules.
    pub validation: ValidationResult,
}

/// Dry-run of [`promote`].
pub async fn preview_promotion(
    store: &VersionStore,
    record: &RecordKey,
    source_env: &str,
    target_env: &str,
) -> Result<PromotionPreview, ConfigError> {
    let plan = plan(store, record, source_env, target_env).await?;
    Ok(PromotionPreview {
        source_environment: source_env.to_string(),
        target_environment: target_env.to_string(),
        target_exists: plan.target_exists,
        diff: plan.diff,
        validation: plan.validation,
    })
}

/// Promote the current config of `source_env` into `target_env`.
///
/// A target without history is created at version 1. Fails with
/// [`ConfigError::PromotionRejected`] when the config is invalid under the
/// target's rules; nothing is written in that case.
pub async fn promote(
    store: &VersionStore,
    record: &RecordKey,
    source_env: &str,
    target_env: &str,
    ctx: &WriteContext,
) -> Result<Version, ConfigError> {
    let plan = plan(store, record, source_env, target_env).await?;
    let (added, removed, changed) = plan.diff.counts();
    info!(
        app = %record.application,
        namespace = %record.namespace,
        source = source_env,
        target = target_env,
        changes = plan.diff.len(),
        added,
        removed,
        changed,
        "promoting configuration"
    );

    let rejected = |result: ValidationResult| ConfigError::PromotionRejected {
        source_env: source_env.to_string(),
        target_env: target_env.to_string(),
        result,
    };

    if !plan.validation.valid {
        warn!(
            app = %record.application,
            namespace = %record.namespace,
            source = source_env,
            target = target_env,
            errors = %plan.validation.summary(),
            "promotion rejected"
        );
        return Err(rejected(plan.validation));
    }

    // The store validates again under the target lock; a policy swapped in
    // between still surfaces as a promotion rejection.
    store
        .put_with(
            &record.env(target_env),
            plan.config,
            &promotion_author(source_env),
            ctx,
        )
        .await
        .map_err(|e| match e {
            ConfigError::ValidationError(result) => rejected(result),
            other => other,
        })
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

struct Plan {
    config: EnvironmentConfig,
    target_exists: bool,
    diff: ConfigDiff,
    validation: ValidationResult,
}

async fn plan(
    store: &VersionStore,
    record: &RecordKey,
    source_env: &str,
    target_env: &str,
) -> Result<Plan, ConfigError> {
    if source_env == target_env {
        return Err(ConfigError::InvalidRequest(format!(
            "source and target environment are both '{source_env}'"
        )));
    }

    let config = store.get(&record.env(source_env)).await?;
    let target = match store.get(&record.env(target_env)).await {
        Ok(current) => Some(current),
        Err(ConfigError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };

    let diff = diff_optional(target.as_ref(), Some(&config));
    debug!(
        record = %record,
        source = source_env,
        target = target_env,
        changes = diff.len(),
        "promotion diff computed"
    );
    let validation = store.validate_environment(target_env, &config).await;

    Ok(Plan {
        target_exists: target.is_some(),
        config,
        diff,
        validation,
    })
}
