//! Template handlers.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use idp_config_core::config::records::apply_template;
use idp_config_core::models::config::ConfigurationRecord;
use idp_config_core::models::template::Template;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::author::RequestAuthor;
use crate::models::{ApplyTemplateQuery, ListResponse};
use crate::services::config::write_context;

/// `GET /templates` — built-in and file templates.
pub async fn list_templates_handler(
    State(state): State<AppState>,
) -> Json<ListResponse<Template>> {
    Json(state.templates.list().to_vec().into())
}

/// `POST /templates/{template}/apply?applicationName=&namespace=&persist=`
///
/// Returns the seeded record; with `persist=true` it is also created.
pub async fn apply_template_handler(
    State(state): State<AppState>,
    axum::Extension(author): axum::Extension<RequestAuthor>,
    Path(template): Path<String>,
    query: Result<Query<ApplyTemplateQuery>, QueryRejection>,
) -> AppResult<(StatusCode, Json<ConfigurationRecord>)> {
    let Query(query) = query?;
    let ctx = write_context(&state, &author.0);
    let record = apply_template(
        &state.store,
        &state.templates,
        &template,
        &query.application_name,
        &query.namespace,
        query.persist,
        &ctx,
    )
    .await?;
    let status = if query.persist {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(record)))
}
