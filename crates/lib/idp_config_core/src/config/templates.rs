// @awa-component: CFG-Templates
//
//! Built-in and file-based configuration templates.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use super::ConfigError;
use crate::models::config::{
    CacheConfig, CacheType, ConfigurationRecord, DatabaseConfig, DatabaseType, EnvironmentConfig,
    GlobalConfig, IngressConfig, ResourceQuantities, ScalingConfig, SizeTier,
};
use crate::models::template::{Template, TemplateSpec, TemplateType};

/// Ordered set of templates, built-ins first.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    /// The built-in templates only.
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Built-ins plus every `*.yaml` / `*.yml` template in `dir`.
    ///
    /// Unreadable or malformed files are logged and skipped, as are files
    /// whose template name is already taken.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut catalog = Self::builtin();

        let entries = std::fs::read_dir(dir).map_err(|e| {
            ConfigError::InvalidRequest(format!("cannot read templates dir {}: {e}", dir.display()))
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        for path in paths {
            let template = match read_template(&path) {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping template file");
                    continue;
                }
            };
            if catalog.get(&template.name).is_some() {
                warn!(
                    path = %path.display(),
                    template = %template.name,
                    "template name already defined, ignoring file"
                );
                continue;
            }
            debug!(path = %path.display(), template = %template.name, "template loaded");
            catalog.templates.push(template);
        }

        info!(count = catalog.templates.len(), "template catalog ready");
        Ok(catalog)
    }

    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Seed a new, unsaved record from a template.
    pub fn apply(
        &self,
        name: &str,
        application: &str,
        namespace: &str,
    ) -> Result<ConfigurationRecord, ConfigError> {
        let template = self
            .get(name)
            .ok_or_else(|| ConfigError::NotFound(format!("template {name}")))?;

        let mut record = ConfigurationRecord::new(application, namespace);
        record.environments = template.configuration.environments.clone();
        record.global = template.configuration.global.clone();
        record.labels = BTreeMap::from([
            ("app".to_string(), application.to_string()),
            ("template".to_string(), template.name.clone()),
        ]);
        Ok(record)
    }
}

fn read_template(path: &Path) -> Result<Template, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let template: Template = serde_yaml::from_str(&raw).map_err(|e| e.to_string())?;
    if template.name.trim().is_empty() {
        return Err("template name is empty".to_string());
    }
    Ok(template)
}

// ---------------------------------------------------------------------------
// Built-ins
// ---------------------------------------------------------------------------

fn sized(
    replicas: u32,
    (req_cpu, req_mem): (&str, &str),
    (lim_cpu, lim_mem): (&str, &str),
) -> EnvironmentConfig {
    EnvironmentConfig::new(
        replicas,
        ResourceQuantities::new(req_cpu, req_mem),
        ResourceQuantities::new(lim_cpu, lim_mem),
    )
}

fn autoscaling(min_replicas: u32, max_replicas: u32) -> Option<ScalingConfig> {
    Some(ScalingConfig {
        enabled: true,
        min_replicas,
        max_replicas,
        ..ScalingConfig::default()
    })
}

fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            name: "web-application".to_string(),
            description: "Web application with ingress and autoscaling in production".to_string(),
            template_type: TemplateType::WebApp,
            configuration: web_application(),
        },
        Template {
            name: "api-service".to_string(),
            description: "REST API service backed by a PostgreSQL database".to_string(),
            template_type: TemplateType::ApiService,
            configuration: api_service(),
        },
        Template {
            name: "background-worker".to_string(),
            description: "Queue consumer with a Redis cache".to_string(),
            template_type: TemplateType::Worker,
            configuration: background_worker(),
        },
        Template {
            name: "scheduled-job".to_string(),
            description: "Periodic batch job".to_string(),
            template_type: TemplateType::CronJob,
            configuration: scheduled_job(),
        },
    ]
}

fn web_application() -> TemplateSpec {
    let mut development = sized(1, ("100m", "128Mi"), ("500m", "512Mi"));
    development.environment.insert("LOG_LEVEL", "debug");

    let mut production = sized(3, ("500m", "512Mi"), ("1000m", "1Gi"));
    production.environment.insert("LOG_LEVEL", "info");
    production.scaling = autoscaling(3, 10);
    production.ingress = Some(IngressConfig {
        enabled: true,
        ..IngressConfig::default()
    });

    TemplateSpec {
        environments: BTreeMap::from([
            ("development".to_string(), development),
            ("production".to_string(), production),
        ]),
        global: Some(GlobalConfig::default()),
    }
}

fn api_service() -> TemplateSpec {
    let mut development = sized(1, ("200m", "256Mi"), ("1000m", "1Gi"));
    development.database = Some(DatabaseConfig::new(DatabaseType::Postgresql, SizeTier::Small));

    let mut production = sized(3, ("1000m", "1Gi"), ("2000m", "2Gi"));
    let mut database = DatabaseConfig::new(DatabaseType::Postgresql, SizeTier::Large);
    database.storage = "100Gi".to_string();
    production.database = Some(database);
    production.secrets.insert("DATABASE_PASSWORD", "db-credentials");

    TemplateSpec {
        environments: BTreeMap::from([
            ("development".to_string(), development),
            ("production".to_string(), production),
        ]),
        global: Some(GlobalConfig::default()),
    }
}

fn background_worker() -> TemplateSpec {
    let mut development = sized(1, ("100m", "256Mi"), ("500m", "512Mi"));
    development.cache = Some(CacheConfig::new(CacheType::Redis, SizeTier::Small));

    let mut production = sized(2, ("500m", "512Mi"), ("1000m", "1Gi"));
    production.scaling = autoscaling(2, 20);
    production.cache = Some(CacheConfig::new(CacheType::Redis, SizeTier::Medium));

    TemplateSpec {
        environments: BTreeMap::from([
            ("development".to_string(), development),
            ("production".to_string(), production),
        ]),
        global: None,
    }
}

fn scheduled_job() -> TemplateSpec {
    let development = sized(1, ("100m", "128Mi"), ("500m", "512Mi"));
    let production = sized(2, ("250m", "256Mi"), ("1000m", "1Gi"));

    TemplateSpec {
        environments: BTreeMap::from([
            ("development".to_string(), development),
            ("production".to_string(), production),
        ]),
        global: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate;

    #[test]
    fn builtins_are_listed_in_order() {
        let catalog = TemplateCatalog::builtin();
        let names: Vec<_> = catalog.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["web-application", "api-service", "background-worker", "scheduled-job"]
        );
    }

    #[test]
    fn every_builtin_applies_to_a_valid_record() {
        let catalog = TemplateCatalog::builtin();
        for template in catalog.list() {
            let record = catalog.apply(&template.name, "orders", "team-a").unwrap();
            let result = validate(&record);
            assert!(result.valid, "{}: {:?}", template.name, result.errors);
        }
    }

    #[test]
    fn apply_sets_identity_and_labels() {
        let record = TemplateCatalog::builtin()
            .apply("api-service", "orders", "team-a")
            .unwrap();
        assert_eq!(record.application, "orders");
        assert_eq!(record.namespace, "team-a");
        assert_eq!(record.labels["template"], "api-service");
        assert_eq!(record.labels["app"], "orders");
        assert!(record.environments["production"].database.is_some());
    }

    #[test]
    fn unknown_template_is_not_found() {
        let err = TemplateCatalog::builtin()
            .apply("nope", "orders", "team-a")
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn load_dir_adds_files_and_skips_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("static-site.yaml"),
            r#"
name: static-site
description: Static files behind a CDN
type: web-app
configuration:
  environments:
    production:
      replicas: 2
      resources:
        requests: { cpu: 50m, memory: 64Mi }
        limits: { cpu: 100m, memory: 128Mi }
"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "name: [unclosed").unwrap();
        std::fs::write(
            dir.path().join("shadow.yaml"),
            "name: api-service\ndescription: x\ntype: worker\nconfiguration: {}\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = TemplateCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.list().len(), 5);
        let site = catalog.get("static-site").unwrap();
        assert_eq!(site.template_type, TemplateType::WebApp);
        assert_eq!(site.configuration.environments["production"].replicas, 2);
        assert_eq!(
            catalog.get("api-service").unwrap().template_type,
            TemplateType::ApiService
        );
    }

    #[test]
    fn load_dir_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(TemplateCatalog::load_dir(&missing).is_err());
    }
}
