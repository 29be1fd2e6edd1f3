//! Service layer between handlers and the core crate.

pub mod config;
