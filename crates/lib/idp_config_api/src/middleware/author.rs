// @awa-component: CFG-RequestAuthor
//
//! Caller identity middleware: `X-Author` header, or the configured default.

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Header carrying the caller identity. Opaque; never parsed.
pub const AUTHOR_HEADER: HeaderName = HeaderName::from_static("x-author");

/// Caller identity stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestAuthor(pub String);

/// Axum middleware: resolves the caller identity and injects
/// `RequestAuthor` into request extensions.
pub async fn attach_author(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let author = request
        .headers()
        .get(&AUTHOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| state.config.default_author.clone());

    request.extensions_mut().insert(RequestAuthor(author));
    next.run(request).await
}
