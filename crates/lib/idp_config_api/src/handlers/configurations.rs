// @awa-component: CFG-ConfigEndpoints
//
//! Record-level configuration handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use idp_config_core::config::preview::{preview_environment, preview_record};
use idp_config_core::config::records;
use idp_config_core::config::validation::ValidationResult;
use idp_config_core::models::config::ConfigurationRecord;

use super::yaml_response;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::author::RequestAuthor;
use crate::models::{EnvironmentQuery, ListResponse, NamespaceQuery};
use crate::services::config::write_context;

/// `GET /configurations?namespace=` — list records, optionally by namespace.
pub async fn list_configurations_handler(
    State(state): State<AppState>,
    query: Result<Query<NamespaceQuery>, QueryRejection>,
) -> AppResult<Json<ListResponse<ConfigurationRecord>>> {
    let Query(query) = query?;
    let items = records::list_records(&state.store, query.namespace.as_deref()).await;
    Ok(Json(items.into()))
}

/// `GET /configurations/{namespace}` — list the records of one namespace.
pub async fn list_namespace_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> AppResult<Json<ListResponse<ConfigurationRecord>>> {
    let items = records::list_records(&state.store, Some(&namespace)).await;
    Ok(Json(items.into()))
}

/// `GET /configurations/{namespace}/{name}` — current view of a record.
pub async fn get_configuration_handler(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> AppResult<Json<ConfigurationRecord>> {
    let record = records::get_record(&state.store, &name, &namespace).await?;
    Ok(Json(record))
}

/// `POST /configurations` — create a record; every environment becomes v1.
pub async fn create_configuration_handler(
    State(state): State<AppState>,
    axum::Extension(author): axum::Extension<RequestAuthor>,
    body: Result<Json<ConfigurationRecord>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ConfigurationRecord>)> {
    let Json(record) = body?;
    let ctx = write_context(&state, &author.0);
    let created = records::create_record(&state.store, record, &ctx).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /configurations/{namespace}/{name}` — update a record.
///
/// The path names the record; a body naming a different one is rejected.
pub async fn update_configuration_handler(
    State(state): State<AppState>,
    axum::Extension(author): axum::Extension<RequestAuthor>,
    Path((namespace, name)): Path<(String, String)>,
    body: Result<Json<ConfigurationRecord>, JsonRejection>,
) -> AppResult<Json<ConfigurationRecord>> {
    let Json(mut record) = body?;
    if (!record.application.is_empty() && record.application != name)
        || (!record.namespace.is_empty() && record.namespace != namespace)
    {
        return Err(AppError::BadRequest(format!(
            "body names {}/{} but path names {namespace}/{name}",
            record.namespace, record.application
        )));
    }
    record.application = name;
    record.namespace = namespace;

    let ctx = write_context(&state, &author.0);
    let updated = records::update_record(&state.store, record, &ctx).await?;
    Ok(Json(updated))
}

/// `DELETE /configurations/{namespace}/{name}` — remove a record and its
/// history. Succeeds for absent records.
pub async fn delete_configuration_handler(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> StatusCode {
    records::delete_record(&state.store, &name, &namespace).await;
    StatusCode::NO_CONTENT
}

/// `POST /configurations/validate` — validate without writing.
pub async fn validate_configuration_handler(
    State(state): State<AppState>,
    body: Result<Json<ConfigurationRecord>, JsonRejection>,
) -> AppResult<Json<ValidationResult>> {
    let Json(record) = body?;
    Ok(Json(state.store.validate_record(&record).await))
}

/// `POST /configurations/preview?environment=` — render a posted record.
pub async fn preview_configuration_handler(
    query: Result<Query<EnvironmentQuery>, QueryRejection>,
    body: Result<Json<ConfigurationRecord>, JsonRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let Json(record) = body?;
    let document = match query.environment.as_deref() {
        Some(environment) => preview_environment(&record, environment)?,
        None => preview_record(&record),
    };
    Ok(yaml_response(document))
}
