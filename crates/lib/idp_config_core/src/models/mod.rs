//! Domain models shared by the store, the engines and the API layer.

pub mod config;
pub mod template;
pub mod version;
