// @awa-component: CFG-PreviewRenderer
//
//! Operator-facing preview of an environment as multi-document YAML.
//!
//! Output is a pure function of the input: struct fields serialize in
//! declaration order and every map is sorted, so two renders of equal
//! configs are byte-identical.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ConfigError;
use super::resolver::{EffectiveConfig, resolve_all, resolve_effective};
use crate::models::config::{ConfigurationRecord, EnvironmentConfig, GlobalConfig};

const API_VERSION: &str = "platform.idp/v1alpha1";
const DOCUMENT_SEPARATOR: &str = "---\n";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a, S: Serialize> {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata<'a>,
    spec: S,
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    labels: BTreeMap<&'static str, &'a str>,
}

#[derive(Serialize)]
struct EnvironmentSpec<'a> {
    environment: &'a str,
    configuration: &'a EnvironmentConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    global: Option<&'a GlobalConfig>,
}

#[derive(Serialize)]
struct InstanceSpec<'a, T: Serialize> {
    environment: &'a str,
    #[serde(flatten)]
    instance: &'a T,
}

/// Render a bare environment config, without record context.
pub fn render(config: &EnvironmentConfig, environment: &str) -> String {
    render_parts(None, None, environment, config, None)
}

/// Render a resolved environment, including its global block.
pub fn render_effective(effective: &EffectiveConfig) -> String {
    render_parts(
        Some(&effective.application),
        Some(&effective.namespace),
        &effective.environment,
        &effective.config,
        Some(&effective.global),
    )
}

/// Render one environment of a record.
pub fn preview_environment(
    record: &ConfigurationRecord,
    environment: &str,
) -> Result<String, ConfigError> {
    Ok(render_effective(&resolve_effective(record, environment)?))
}

/// Render every environment of a record in name order.
pub fn preview_record(record: &ConfigurationRecord) -> String {
    resolve_all(record)
        .iter()
        .map(render_effective)
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn render_parts(
    application: Option<&str>,
    namespace: Option<&str>,
    environment: &str,
    config: &EnvironmentConfig,
    global: Option<&GlobalConfig>,
) -> String {
    let base = application.unwrap_or("environment");
    let metadata = |suffix: &str| {
        let mut labels = BTreeMap::new();
        if let Some(app) = application {
            labels.insert("app", app);
        }
        labels.insert("environment", environment);
        Metadata {
            name: format!("{base}-{environment}{suffix}"),
            namespace,
            labels,
        }
    };

    let mut docs = vec![to_yaml(&Document {
        api_version: API_VERSION,
        kind: "EnvironmentPreview",
        metadata: metadata(""),
        spec: EnvironmentSpec {
            environment,
            configuration: config,
            global,
        },
    })];

    if let Some(database) = &config.database {
        docs.push(to_yaml(&Document {
            api_version: API_VERSION,
            kind: "DatabaseInstance",
            metadata: metadata("-db"),
            spec: InstanceSpec {
                environment,
                instance: database,
            },
        }));
    }
    if let Some(cache) = &config.cache {
        docs.push(to_yaml(&Document {
            api_version: API_VERSION,
            kind: "CacheInstance",
            metadata: metadata("-cache"),
            spec: InstanceSpec {
                environment,
                instance: cache,
            },
        }));
    }

    docs.join(DOCUMENT_SEPARATOR)
}

fn to_yaml<T: Serialize>(value: &T) -> String {
    // String-keyed structs and maps always serialize; keep the fallback
    // visible in the document rather than panicking.
    serde_yaml::to_string(value).unwrap_or_else(|e| format!("# preview unavailable: {e}\n"))
}
