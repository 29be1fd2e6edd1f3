//! Subcommand implementations. Each returns the process exit code.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use idp_config_core::config::ConfigError;
use idp_config_core::config::diff::{ConfigDiff, diff_optional};
use idp_config_core::config::preview::{preview_environment, preview_record, render};
use idp_config_core::config::templates::TemplateCatalog;
use idp_config_core::config::validation::{ValidationPolicy, ValidationResult};
use idp_config_core::models::config::{ConfigurationRecord, EnvironmentConfig};

use crate::{Error, Result};

/// Exit code for a file that parsed but failed validation.
pub const EXIT_INVALID: i32 = 2;

/// A parsed input file.
pub enum Document {
    Record(ConfigurationRecord),
    Environment(EnvironmentConfig),
}

/// Read a YAML or JSON file. A top-level `environments` key marks a record.
pub fn load(path: &Path) -> Result<Document> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Custom(format!("{}: {e}", path.display())))?;
    let value: serde_yaml::Value = serde_yaml::from_str(&raw)?;
    let is_record = value
        .as_mapping()
        .is_some_and(|m| m.contains_key("environments"));
    log::debug!("{}: parsed as {}", path.display(), if is_record { "record" } else { "environment" });
    if is_record {
        Ok(Document::Record(serde_yaml::from_value(value)?))
    } else {
        Ok(Document::Environment(serde_yaml::from_value(value)?))
    }
}

pub fn validate(file: &Path, environment: Option<&str>) -> Result<i32> {
    let policy = ValidationPolicy::default();
    let result: ValidationResult = match (load(file)?, environment) {
        (Document::Record(record), None) => policy.validate_record(&record),
        (Document::Record(record), Some(env)) => {
            policy.validate_environment(env, record_environment(&record, env)?)
        }
        (Document::Environment(config), Some(env)) => policy.validate_environment(env, &config),
        (Document::Environment(_), None) => return Err(environment_required()),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.is_valid() {
        Ok(0)
    } else {
        log::debug!("{} error(s) in {}", result.errors.len(), file.display());
        Ok(EXIT_INVALID)
    }
}

pub fn preview(file: &Path, environment: Option<&str>) -> Result<i32> {
    let document = match (load(file)?, environment) {
        (Document::Record(record), None) => preview_record(&record),
        (Document::Record(record), Some(env)) => preview_environment(&record, env)?,
        (Document::Environment(config), Some(env)) => render(&config, env),
        (Document::Environment(_), None) => return Err(environment_required()),
    };
    print!("{document}");
    Ok(0)
}

pub fn diff(a: &Path, b: &Path, environment: Option<&str>) -> Result<i32> {
    let output = match (load(a)?, load(b)?, environment) {
        (Document::Record(a), Document::Record(b), None) => {
            let names: BTreeSet<&String> =
                a.environments.keys().chain(b.environments.keys()).collect();
            let per_env: BTreeMap<&String, ConfigDiff> = names
                .into_iter()
                .map(|name| {
                    let diff = diff_optional(a.environments.get(name), b.environments.get(name));
                    (name, diff)
                })
                .collect();
            serde_json::to_string_pretty(&per_env)?
        }
        (a, b, environment) => {
            let left = select(&a, environment)?;
            let right = select(&b, environment)?;
            let diff = diff_optional(left, right);
            let (added, removed, changed) = diff.counts();
            log::debug!("{added} added, {removed} removed, {changed} changed");
            serde_json::to_string_pretty(&diff)?
        }
    };
    println!("{output}");
    Ok(0)
}

pub fn templates(dir: Option<&Path>) -> Result<i32> {
    let catalog = match dir {
        Some(dir) => TemplateCatalog::load_dir(dir)?,
        None => TemplateCatalog::builtin(),
    };
    for template in catalog.list() {
        println!(
            "{:<24} {:<12} {}",
            template.name,
            template.template_type.as_str(),
            template.description
        );
    }
    Ok(0)
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn environment_required() -> Error {
    Error::Custom("--environment is required for a single environment file".into())
}

fn record_environment<'a>(
    record: &'a ConfigurationRecord,
    environment: &str,
) -> Result<&'a EnvironmentConfig> {
    record.environments.get(environment).ok_or_else(|| {
        ConfigError::NotFound(format!(
            "{}/{} environment {environment}",
            record.namespace, record.application
        ))
        .into()
    })
}

/// The config a diff side contributes. A record without the environment
/// contributes nothing, so the diff shows it as added or removed.
fn select<'a>(
    document: &'a Document,
    environment: Option<&str>,
) -> Result<Option<&'a EnvironmentConfig>> {
    match (document, environment) {
        (Document::Environment(config), _) => Ok(Some(config)),
        (Document::Record(record), Some(env)) => Ok(record.environments.get(env)),
        (Document::Record(_), None) => Err(Error::Custom(
            "--environment is required to compare a record with an environment file".into(),
        )),
    }
}
