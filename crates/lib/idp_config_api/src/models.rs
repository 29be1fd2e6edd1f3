//! Request and response bodies.

use idp_config_core::config::diff::ConfigDiff;
use idp_config_core::config::validation::ValidationResult;
use serde::{Deserialize, Serialize};

/// Error body returned by every failing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Field-level detail for validation and promotion failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `{ "items": [...], "total": n }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamespaceQuery {
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentQuery {
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub source_environment: String,
    pub target_environment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RollbackRequest {
    pub version: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionDiffQuery {
    pub from: u64,
    pub to: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareQuery {
    pub env1: String,
    pub env2: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTemplateQuery {
    pub application_name: String,
    pub namespace: String,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub env1: String,
    pub env2: String,
    pub diff: ConfigDiff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDiffResponse {
    pub environment: String,
    pub from: u64,
    pub to: u64,
    pub diff: ConfigDiff,
}
