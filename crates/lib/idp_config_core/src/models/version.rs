// @awa-component: CFG-Schema
//
//! Version snapshots and their provenance strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::EnvironmentConfig;

/// Provenance recorded for writes made through the API without a more
/// specific origin.
pub const DIRECT_AUTHOR: &str = "api";

/// Immutable snapshot of one environment's configuration.
///
/// Numbers start at 1 per `(application, namespace, environment)` and grow
/// by exactly one per accepted write. The current configuration of an
/// environment is the config of its highest-numbered version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub environment: String,
    pub version_number: u64,
    pub config: EnvironmentConfig,
    /// Opaque provenance, e.g. `promotion:staging` or `rollback:v3`.
    pub author: String,
    /// Identity supplied by the caller, if any. Never parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Validation warnings present when the version was written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Provenance for a version written by promotion from `source_env`.
pub fn promotion_author(source_env: &str) -> String {
    format!("promotion:{source_env}")
}

/// Provenance for a version written by rolling back to `version_number`.
pub fn rollback_author(version_number: u64) -> String {
    format!("rollback:v{version_number}")
}

/// Provenance for a version seeded from a template.
pub fn template_author(template_name: &str) -> String {
    format!("template:{template_name}")
}
