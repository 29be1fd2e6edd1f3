//! # idp_config_api
//!
//! HTTP API library for the IDP configuration manager.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use idp_config_core::config::ConfigError;
use idp_config_core::config::store::VersionStore;
use idp_config_core::config::templates::TemplateCatalog;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{configurations, environments, health, promotion, templates};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Versioned configuration store.
    pub store: Arc<VersionStore>,
    /// Templates offered by `GET /templates`.
    pub templates: Arc<TemplateCatalog>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Empty store under the configured policy, plus the template catalog.
    pub fn from_config(config: ApiConfig) -> Result<Self, ConfigError> {
        let templates = match &config.templates_dir {
            Some(dir) => TemplateCatalog::load_dir(dir)?,
            None => TemplateCatalog::builtin(),
        };
        Ok(Self {
            store: Arc::new(VersionStore::new(config.policy.clone())),
            templates: Arc::new(templates),
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let configurations = Router::new()
        .route(
            routes::CONFIGURATIONS,
            get(configurations::list_configurations_handler)
                .post(configurations::create_configuration_handler),
        )
        .route(
            routes::POST_CONFIGURATIONS_VALIDATE,
            post(configurations::validate_configuration_handler),
        )
        .route(
            routes::POST_CONFIGURATIONS_PREVIEW,
            post(configurations::preview_configuration_handler),
        )
        .route(
            routes::GET_CONFIGURATIONS_NAMESPACE,
            get(configurations::list_namespace_handler),
        )
        .route(
            routes::CONFIGURATIONS_NAMESPACE_NAME,
            get(configurations::get_configuration_handler)
                .put(configurations::update_configuration_handler)
                .delete(configurations::delete_configuration_handler),
        );

    let environments = Router::new()
        .route(
            routes::ENVIRONMENT,
            get(environments::get_environment_handler).put(environments::put_environment_handler),
        )
        .route(
            routes::GET_ENVIRONMENT_HISTORY,
            get(environments::history_handler),
        )
        .route(
            routes::GET_ENVIRONMENT_PREVIEW,
            get(environments::preview_environment_handler),
        )
        .route(
            routes::GET_ENVIRONMENT_DIFF,
            get(environments::diff_versions_handler),
        )
        .route(
            routes::POST_ENVIRONMENT_ROLLBACK,
            post(environments::rollback_handler),
        );

    let promotions = Router::new()
        .route(routes::POST_PROMOTE, post(promotion::promote_handler))
        .route(
            routes::POST_PROMOTE_PREVIEW,
            post(promotion::promotion_preview_handler),
        )
        .route(routes::GET_COMPARE, get(promotion::compare_handler));

    let templates = Router::new()
        .route(routes::GET_TEMPLATES, get(templates::list_templates_handler))
        .route(
            routes::POST_TEMPLATE_APPLY,
            post(templates::apply_template_handler),
        );

    Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .merge(configurations)
        .merge(environments)
        .merge(promotions)
        .merge(templates)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::author::attach_author,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
