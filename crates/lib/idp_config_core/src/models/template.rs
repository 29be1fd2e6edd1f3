// @awa-component: CFG-Schema
//
//! Configuration templates: typed partial records used to seed new ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::{EnvironmentConfig, GlobalConfig};

/// Kind of workload a template targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateType {
    WebApp,
    ApiService,
    Worker,
    CronJob,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::WebApp => "web-app",
            TemplateType::ApiService => "api-service",
            TemplateType::Worker => "worker",
            TemplateType::CronJob => "cron-job",
        }
    }
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The partial record a template contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalConfig>,
}

/// A named template, as listed by `GET /templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    pub configuration: TemplateSpec,
}
