// @awa-component: CFG-PromotionEndpoints
//
//! Promotion and environment comparison handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use idp_config_core::config::RecordKey;
use idp_config_core::config::diff::compare_environments;
use idp_config_core::config::promotion::{PromotionPreview, preview_promotion, promote};
use idp_config_core::models::version::Version;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::author::RequestAuthor;
use crate::models::{CompareQuery, CompareResponse, PromoteRequest};
use crate::services::config::write_context;

/// `POST /configurations/{namespace}/{name}/promote` — promote one environment into another.
pub async fn promote_handler(
    State(state): State<AppState>,
    axum::Extension(author): axum::Extension<RequestAuthor>,
    Path((namespace, name)): Path<(String, String)>,
    body: Result<Json<PromoteRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Version>)> {
    let Json(request) = body?;
    let ctx = write_context(&state, &author.0);
    let version = promote(
        &state.store,
        &RecordKey::new(name, namespace),
        &request.source_environment,
        &request.target_environment,
        &ctx,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// `POST /configurations/{namespace}/{name}/promote/preview` — dry-run.
pub async fn promotion_preview_handler(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
    body: Result<Json<PromoteRequest>, JsonRejection>,
) -> AppResult<Json<PromotionPreview>> {
    let Json(request) = body?;
    let preview = preview_promotion(
        &state.store,
        &RecordKey::new(name, namespace),
        &request.source_environment,
        &request.target_environment,
    )
    .await?;
    Ok(Json(preview))
}

/// `GET /configurations/{namespace}/{name}/compare?env1=&env2=`
pub async fn compare_handler(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
    query: Result<Query<CompareQuery>, QueryRejection>,
) -> AppResult<Json<CompareResponse>> {
    let Query(query) = query?;
    let diff = compare_environments(
        &state.store,
        &RecordKey::new(name, namespace),
        &query.env1,
        &query.env2,
    )
    .await?;
    Ok(Json(CompareResponse {
        env1: query.env1,
        env2: query.env2,
        diff,
    }))
}
