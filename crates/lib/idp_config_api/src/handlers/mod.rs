//! Request handlers.

pub mod configurations;
pub mod environments;
pub mod health;
pub mod promotion;
pub mod templates;

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

/// Plain YAML body for preview documents.
pub(crate) fn yaml_response(document: String) -> Response {
    ([(CONTENT_TYPE, "application/yaml")], document).into_response()
}
