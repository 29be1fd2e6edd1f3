// @awa-component: CFG-ConfigService
//
//! Configuration service: maps core errors onto HTTP errors and builds the
//! write context for a request.

use idp_config_core::config::ConfigError;
use idp_config_core::config::store::WriteContext;

use crate::AppState;
use crate::error::AppError;

// ---------------------------------------------------------------------------
// Error conversion
// ---------------------------------------------------------------------------

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        let message = e.to_string();
        match e {
            ConfigError::NotFound(_) | ConfigError::VersionNotFound { .. } => {
                AppError::NotFound(message)
            }
            ConfigError::AlreadyExists(_) | ConfigError::ConcurrencyConflict(_) => {
                AppError::Conflict(message)
            }
            ConfigError::ValidationError(result) => AppError::Validation {
                message,
                details: Some(result),
            },
            ConfigError::PromotionRejected { result, .. } => AppError::PromotionRejected {
                message,
                details: result,
            },
            ConfigError::InvalidRequest(_) => AppError::BadRequest(message),
            ConfigError::Timeout(_) => AppError::Unavailable(message),
            ConfigError::Snapshot(_) => AppError::Internal(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Write context
// ---------------------------------------------------------------------------

/// Write options for a request made by `author`.
pub fn write_context(state: &AppState, author: &str) -> WriteContext {
    let ctx = WriteContext::requested_by(author);
    match state.config.lock_timeout() {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx,
    }
}
