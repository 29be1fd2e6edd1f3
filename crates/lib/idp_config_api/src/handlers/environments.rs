// @awa-component: CFG-EnvironmentEndpoints
//
//! Per-environment handlers: current config, direct writes, history,
//! preview, version diff and rollback.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use idp_config_core::config::EnvKey;
use idp_config_core::config::diff::compare_versions;
use idp_config_core::config::preview::render_effective;
use idp_config_core::config::records::put_environment;
use idp_config_core::config::resolver::get_effective_config;
use idp_config_core::config::rollback::rollback;
use idp_config_core::models::config::EnvironmentConfig;
use idp_config_core::models::version::Version;

use super::yaml_response;
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::author::RequestAuthor;
use crate::models::{ListResponse, RollbackRequest, VersionDiffQuery, VersionDiffResponse};
use crate::services::config::write_context;

fn env_key((namespace, name, environment): (String, String, String)) -> EnvKey {
    EnvKey::new(name, namespace, environment)
}

/// `GET /configurations/{namespace}/{name}/environments/{env}` — current version.
pub async fn get_environment_handler(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
) -> AppResult<Json<Version>> {
    Ok(Json(state.store.current_version(&env_key(path)).await?))
}

/// `PUT /configurations/{namespace}/{name}/environments/{env}` — append a version.
pub async fn put_environment_handler(
    State(state): State<AppState>,
    axum::Extension(author): axum::Extension<RequestAuthor>,
    Path(path): Path<(String, String, String)>,
    body: Result<Json<EnvironmentConfig>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Version>)> {
    let Json(config) = body?;
    let ctx = write_context(&state, &author.0);
    let version = put_environment(&state.store, &env_key(path), config, &ctx).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// `GET /configurations/{namespace}/{name}/environments/{env}/history` — newest first.
pub async fn history_handler(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
) -> AppResult<Json<ListResponse<Version>>> {
    let history = state.store.history(&env_key(path)).await?;
    Ok(Json(history.into()))
}

/// `GET /configurations/{namespace}/{name}/environments/{env}/preview` — YAML preview.
pub async fn preview_environment_handler(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
) -> AppResult<Response> {
    let effective = get_effective_config(&state.store, &env_key(path)).await?;
    Ok(yaml_response(render_effective(&effective)))
}

/// `GET /configurations/{namespace}/{name}/environments/{env}/diff?from=&to=`
pub async fn diff_versions_handler(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
    query: Result<Query<VersionDiffQuery>, QueryRejection>,
) -> AppResult<Json<VersionDiffResponse>> {
    let Query(query) = query?;
    let key = env_key(path);
    let diff = compare_versions(&state.store, &key, query.from, query.to).await?;
    Ok(Json(VersionDiffResponse {
        environment: key.environment,
        from: query.from,
        to: query.to,
        diff,
    }))
}

/// `POST /configurations/{namespace}/{name}/environments/{env}/rollback`
pub async fn rollback_handler(
    State(state): State<AppState>,
    axum::Extension(author): axum::Extension<RequestAuthor>,
    Path(path): Path<(String, String, String)>,
    body: Result<Json<RollbackRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Version>)> {
    let Json(request) = body?;
    let ctx = write_context(&state, &author.0);
    let version = rollback(&state.store, &env_key(path), request.version, &ctx).await?;
    Ok((StatusCode::CREATED, Json(version)))
}
