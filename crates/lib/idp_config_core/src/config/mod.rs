// @awa-component: CFG-ConfigStore
//
//! Configuration module: validation, versioned storage, diff, promotion,
//! rollback, preview and templates.

pub mod diff;
pub mod preview;
pub mod promotion;
pub mod quantity;
pub mod records;
pub mod resolver;
pub mod rollback;
pub mod snapshot;
pub mod store;
pub mod templates;
pub mod validation;

use std::fmt;

use thiserror::Error;

use validation::ValidationResult;

/// Configuration errors.
///
/// Every variant is recoverable and scoped to the failing request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found: {0}")]
    NotFound(String),

    #[error("Version {version} not found for environment {environment}")]
    VersionNotFound { environment: String, version: u64 },

    #[error("Configuration already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {}", .0.summary())]
    ValidationError(ValidationResult),

    #[error("Promotion from {source_env} to {target_env} rejected: {}", .result.summary())]
    PromotionRejected {
        source_env: String,
        target_env: String,
        result: ValidationResult,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reserved for an optimistic-concurrency write mode; the per-key
    /// locking store never produces it.
    #[error("Concurrent modification: {0}")]
    ConcurrencyConflict(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl ConfigError {
    /// The validation result carried by validation-type errors.
    pub fn validation_result(&self) -> Option<&ValidationResult> {
        match self {
            ConfigError::ValidationError(result) => Some(result),
            ConfigError::PromotionRejected { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Identifies a configuration record: `(application, namespace)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub application: String,
    pub namespace: String,
}

impl RecordKey {
    pub fn new(application: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            namespace: namespace.into(),
        }
    }

    /// Key of one environment of this record.
    pub fn env(&self, environment: impl Into<String>) -> EnvKey {
        EnvKey {
            application: self.application.clone(),
            namespace: self.namespace.clone(),
            environment: environment.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.application)
    }
}

/// Identifies one versioned lineage: `(application, namespace, environment)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvKey {
    pub application: String,
    pub namespace: String,
    pub environment: String,
}

impl EnvKey {
    pub fn new(
        application: impl Into<String>,
        namespace: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            namespace: namespace.into(),
            environment: environment.into(),
        }
    }

    pub fn record(&self) -> RecordKey {
        RecordKey::new(self.application.clone(), self.namespace.clone())
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.namespace, self.application, self.environment
        )
    }
}
