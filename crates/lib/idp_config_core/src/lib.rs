//! # idp_config_core
//!
//! Versioned, validated per-environment configuration records: the store,
//! the validator, structural diff, promotion, rollback, preview and
//! templates.

pub mod config;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
