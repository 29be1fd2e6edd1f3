// @awa-component: CFG-Validator
//
//! Structural and semantic validation of configuration records.
//!
//! Validation is pure: the same policy and input always produce the same
//! [`ValidationResult`]. Errors block writes; warnings are attached to the
//! written version for audit.

use serde::{Deserialize, Serialize};

use super::RecordKey;
use super::quantity::{parse_cpu_millis, parse_memory_bytes};
use crate::models::config::{
    CacheConfig, CacheType, ConfigurationRecord, DatabaseConfig, DatabaseType, EnvMap,
    EnvironmentConfig, GlobalConfig, IngressConfig, ResourceQuantities, ScalingConfig, SizeTier,
};

/// Namespaces that collide with the fixed `/configurations/validate` and
/// `/configurations/preview` routes.
pub const RESERVED_NAMESPACES: [&str; 2] = ["validate", "preview"];

/// Pod security levels accepted in the global block.
const POD_SECURITY_LEVELS: [&str; 3] = ["privileged", "baseline", "restricted"];

/// Outcome of validating a record or an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field path.
    pub fn error(&mut self, field: &str, message: impl AsRef<str>) {
        self.errors.push(format!("{field}: {}", message.as_ref()));
        self.valid = false;
    }

    /// Record a warning against a field path.
    pub fn warn(&mut self, field: &str, message: impl AsRef<str>) {
        self.warnings.push(format!("{field}: {}", message.as_ref()));
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Errors joined for log lines and plain-text messages.
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

/// Tunable rules applied on top of the fixed structural checks.
///
/// The store owns the active policy and may replace it at runtime, so a
/// config accepted yesterday can be rejected today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Upper bound for `replicas` and `scaling.maxReplicas`.
    pub max_replicas: u32,
    /// Upper bound for `resources.limits.cpu`, in millicores.
    pub max_cpu_millis: u64,
    /// Upper bound for `resources.limits.memory`, in bytes.
    pub max_memory_bytes: u128,
    /// Replica floor below which production environments without
    /// autoscaling get a warning.
    pub production_min_replicas: u32,
    /// Environment names the production rules apply to.
    pub production_environments: Vec<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_replicas: 100,
            max_cpu_millis: 16_000,
            max_memory_bytes: 64 * 1024 * 1024 * 1024,
            production_min_replicas: 2,
            production_environments: vec!["production".to_string()],
        }
    }
}

/// Validate a record against the default policy.
pub fn validate(record: &ConfigurationRecord) -> ValidationResult {
    ValidationPolicy::default().validate_record(record)
}

impl ValidationPolicy {
    pub fn is_production(&self, environment: &str) -> bool {
        self.production_environments.iter().any(|e| e == environment)
    }

    /// Validate a whole record, including every environment it carries.
    pub fn validate_record(&self, record: &ConfigurationRecord) -> ValidationResult {
        let mut result = ValidationResult::new();

        check_record_names(&mut result, &record.application, &record.namespace);

        if record.environments.is_empty() {
            result.warn("environments", "No environments configured");
        }

        for (name, config) in &record.environments {
            result.merge(self.validate_environment(name, config));
        }

        if let Some(global) = &record.global {
            validate_global(&mut result, global);
        }

        result
    }

    /// Validate the names a record is stored under.
    pub fn validate_key(&self, key: &RecordKey) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_record_names(&mut result, &key.application, &key.namespace);
        result
    }

    /// Validate one environment's config under the rules of `environment`.
    ///
    /// Environment-specific rules look at the name passed here, which is
    /// how promotion evaluates a source config in the target's context.
    pub fn validate_environment(
        &self,
        environment: &str,
        config: &EnvironmentConfig,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        let prefix = format!("environments.{environment}");

        check_dns_label(&mut result, &prefix, environment, "Environment name");

        if config.replicas > self.max_replicas {
            result.error(
                &format!("{prefix}.replicas"),
                format!("{} exceeds the maximum of {}", config.replicas, self.max_replicas),
            );
        }
        if config.replicas == 0 && !config.autoscaling_enabled() {
            result.warn(
                &format!("{prefix}.replicas"),
                "0 replicas; the environment will not serve traffic",
            );
        }

        self.validate_resources(&mut result, &prefix, config);
        validate_env_map(&mut result, &format!("{prefix}.environment"), &config.environment);
        validate_env_map(&mut result, &format!("{prefix}.secrets"), &config.secrets);
        for (name, reference) in config.secrets.iter() {
            if reference.trim().is_empty() {
                result.error(
                    &format!("{prefix}.secrets.{name}"),
                    "secret reference must not be empty",
                );
            }
            if config.environment.get(name).is_some() {
                result.warn(
                    &format!("{prefix}.secrets.{name}"),
                    "also defined as a plain environment variable; the secret takes precedence",
                );
            }
        }

        if let Some(scaling) = &config.scaling {
            self.validate_scaling(&mut result, &prefix, config.replicas, scaling);
        }

        if self.is_production(environment)
            && !config.autoscaling_enabled()
            && config.replicas < self.production_min_replicas
        {
            result.warn(
                &format!("{prefix}.replicas"),
                format!(
                    "production environment runs {} replica(s) without autoscaling; \
                     at least {} recommended",
                    config.replicas, self.production_min_replicas
                ),
            );
        }

        if let Some(ingress) = &config.ingress {
            validate_ingress(&mut result, &format!("{prefix}.ingress"), ingress);
        }
        if let Some(database) = &config.database {
            validate_database(&mut result, &format!("{prefix}.database"), database);
        }
        if let Some(cache) = &config.cache {
            validate_cache(&mut result, &format!("{prefix}.cache"), cache);
        }

        result
    }

    fn validate_resources(
        &self,
        result: &mut ValidationResult,
        prefix: &str,
        config: &EnvironmentConfig,
    ) {
        let requests = parse_quantities(
            result,
            &format!("{prefix}.resources.requests"),
            &config.resources.requests,
        );
        let limits = parse_quantities(
            result,
            &format!("{prefix}.resources.limits"),
            &config.resources.limits,
        );

        if let (Some(req), Some(lim)) = (requests.cpu, limits.cpu)
            && req > lim
        {
            result.error(
                &format!("{prefix}.resources.requests.cpu"),
                format!(
                    "request {} exceeds limit {}",
                    config.resources.requests.cpu, config.resources.limits.cpu
                ),
            );
        }
        if let (Some(req), Some(lim)) = (requests.memory, limits.memory)
            && req > lim
        {
            result.error(
                &format!("{prefix}.resources.requests.memory"),
                format!(
                    "request {} exceeds limit {}",
                    config.resources.requests.memory, config.resources.limits.memory
                ),
            );
        }

        if let Some(lim) = limits.cpu
            && lim > self.max_cpu_millis
        {
            result.error(
                &format!("{prefix}.resources.limits.cpu"),
                format!("{}m exceeds the maximum of {}m", lim, self.max_cpu_millis),
            );
        }
        if let Some(lim) = limits.memory
            && lim > self.max_memory_bytes
        {
            result.error(
                &format!("{prefix}.resources.limits.memory"),
                format!(
                    "{} bytes exceeds the maximum of {} bytes",
                    lim, self.max_memory_bytes
                ),
            );
        }
    }

    fn validate_scaling(
        &self,
        result: &mut ValidationResult,
        prefix: &str,
        replicas: u32,
        scaling: &ScalingConfig,
    ) {
        let field = format!("{prefix}.scaling");

        if scaling.min_replicas == 0 {
            result.error(&field, "minReplicas must be at least 1");
        }
        if scaling.min_replicas > scaling.max_replicas {
            result.error(
                &field,
                format!(
                    "minReplicas ({}) exceeds maxReplicas ({})",
                    scaling.min_replicas, scaling.max_replicas
                ),
            );
        }
        if scaling.max_replicas > self.max_replicas {
            result.error(
                &field,
                format!(
                    "maxReplicas ({}) exceeds the maximum of {}",
                    scaling.max_replicas, self.max_replicas
                ),
            );
        }
        check_percentage(
            result,
            &format!("{field}.targetCPUUtilization"),
            scaling.target_cpu_utilization,
        );
        if let Some(memory) = scaling.target_memory_utilization {
            check_percentage(result, &format!("{field}.targetMemoryUtilization"), memory);
        }

        if scaling.enabled
            && scaling.min_replicas <= scaling.max_replicas
            && !(scaling.min_replicas..=scaling.max_replicas).contains(&replicas)
        {
            result.error(
                &format!("{prefix}.replicas"),
                format!(
                    "{} is outside the autoscaling range {}..={}",
                    replicas, scaling.min_replicas, scaling.max_replicas
                ),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ParsedQuantities {
    cpu: Option<u64>,
    memory: Option<u128>,
}

fn parse_quantities(
    result: &mut ValidationResult,
    field: &str,
    quantities: &ResourceQuantities,
) -> ParsedQuantities {
    let mut parsed = ParsedQuantities::default();

    if quantities.cpu.trim().is_empty() {
        result.error(&format!("{field}.cpu"), "is required");
    } else {
        parsed.cpu = parse_cpu_millis(&quantities.cpu);
        if parsed.cpu.is_none() {
            result.error(
                &format!("{field}.cpu"),
                format!("invalid CPU quantity '{}'", quantities.cpu),
            );
        }
    }

    if quantities.memory.trim().is_empty() {
        result.error(&format!("{field}.memory"), "is required");
    } else {
        parsed.memory = parse_memory_bytes(&quantities.memory);
        if parsed.memory.is_none() {
            result.error(
                &format!("{field}.memory"),
                format!("invalid memory quantity '{}'", quantities.memory),
            );
        }
    }

    parsed
}

fn check_percentage(result: &mut ValidationResult, field: &str, value: u32) {
    if value == 0 || value > 100 {
        result.error(field, format!("{value} is outside (0, 100]"));
    }
}

fn validate_env_map(result: &mut ValidationResult, field: &str, map: &EnvMap) {
    for name in map.duplicate_names() {
        result.error(field, format!("duplicate name '{name}'"));
    }
    for (name, _) in map.iter() {
        if !is_env_var_name(name) {
            result.error(
                field,
                format!("'{name}' is not a valid environment variable name"),
            );
        }
    }
}

fn validate_ingress(result: &mut ValidationResult, field: &str, ingress: &IngressConfig) {
    let host = ingress.host.as_deref().map(str::trim).unwrap_or("");

    if ingress.tls && host.is_empty() {
        result.error(&format!("{field}.host"), "is required when tls is enabled");
    }
    if ingress.enabled && host.is_empty() && !ingress.tls {
        result.warn(
            &format!("{field}.host"),
            "ingress is enabled without a host; it will match every host",
        );
    }
    if !host.is_empty() && !is_hostname(host) {
        result.error(&format!("{field}.host"), format!("'{host}' is not a valid hostname"));
    }
    if !ingress.path.starts_with('/') {
        result.error(&format!("{field}.path"), "must start with '/'");
    }
}

fn validate_database(result: &mut ValidationResult, field: &str, database: &DatabaseConfig) {
    if DatabaseType::parse(&database.kind).is_none() {
        result.error(
            &format!("{field}.type"),
            format!(
                "'{}' is not one of {}",
                database.kind,
                join_names(DatabaseType::ALL.iter().map(|t| t.as_str()))
            ),
        );
    }
    check_size(result, &format!("{field}.size"), &database.size);
    if parse_memory_bytes(&database.storage).is_none_or(|b| b == 0) {
        result.error(
            &format!("{field}.storage"),
            format!("invalid storage quantity '{}'", database.storage),
        );
    }
}

fn validate_cache(result: &mut ValidationResult, field: &str, cache: &CacheConfig) {
    if CacheType::parse(&cache.kind).is_none() {
        result.error(
            &format!("{field}.type"),
            format!(
                "'{}' is not one of {}",
                cache.kind,
                join_names(CacheType::ALL.iter().map(|t| t.as_str()))
            ),
        );
    }
    check_size(result, &format!("{field}.size"), &cache.size);
    if cache.nodes == 0 {
        result.error(&format!("{field}.nodes"), "must be at least 1");
    }
}

fn validate_global(result: &mut ValidationResult, global: &GlobalConfig) {
    let policy = &global.security.pod_security_policy;
    if !POD_SECURITY_LEVELS.contains(&policy.as_str()) {
        result.error(
            "global.security.podSecurityPolicy",
            format!(
                "'{policy}' is not one of {}",
                join_names(POD_SECURITY_LEVELS.iter().copied())
            ),
        );
    }

    let backup = &global.backup;
    if backup.enabled {
        if backup.schedule.split_whitespace().count() != 5 {
            result.error(
                "global.backup.schedule",
                format!("'{}' is not a 5-field cron expression", backup.schedule),
            );
        }
        if !is_retention(&backup.retention) {
            result.error(
                "global.backup.retention",
                format!("'{}' must look like 30d, 12h or 4w", backup.retention),
            );
        }
    }
    if !global.monitoring.enabled && global.monitoring.alerts {
        result.warn(
            "global.monitoring.alerts",
            "alerts have no effect while monitoring is disabled",
        );
    }
}

fn check_size(result: &mut ValidationResult, field: &str, size: &str) {
    if SizeTier::parse(size).is_none() {
        result.error(
            field,
            format!(
                "'{size}' is not one of {}",
                join_names(SizeTier::ALL.iter().map(|t| t.as_str()))
            ),
        );
    }
}

fn check_record_names(result: &mut ValidationResult, application: &str, namespace: &str) {
    check_dns_label(result, "application", application, "Application name");
    check_dns_label(result, "namespace", namespace, "Namespace");
    if RESERVED_NAMESPACES.contains(&namespace) {
        result.error("namespace", format!("Namespace '{namespace}' is reserved"));
    }
}

fn check_dns_label(result: &mut ValidationResult, field: &str, value: &str, what: &str) {
    if value.trim().is_empty() {
        result.error(field, format!("{what} is required"));
    } else if !is_dns_label(value) {
        result.error(
            field,
            format!(
                "{what} '{value}' must be a lowercase DNS label \
                 (a-z, 0-9, '-', at most 63 characters)"
            ),
        );
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// RFC 1123 label: lowercase alphanumerics and '-', alphanumeric at both ends.
pub fn is_dns_label(s: &str) -> bool {
    let bytes = s.as_bytes();
    !bytes.is_empty()
        && bytes.len() <= 63
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

fn is_env_var_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_hostname(host: &str) -> bool {
    let host = host.strip_prefix("*.").unwrap_or(host);
    host.len() <= 253 && host.split('.').all(is_dns_label)
}

fn is_retention(s: &str) -> bool {
    match s.char_indices().last() {
        Some((idx, unit)) => {
            matches!(unit, 'h' | 'd' | 'w')
                && idx > 0
                && s[..idx].bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{ResourceQuantities, ScalingConfig};

    fn env(replicas: u32) -> EnvironmentConfig {
        EnvironmentConfig::new(
            replicas,
            ResourceQuantities::new("100m", "128Mi"),
            ResourceQuantities::new("500m", "512Mi"),
        )
    }

    fn record(env_name: &str, config: EnvironmentConfig) -> ConfigurationRecord {
        ConfigurationRecord::new("orders", "team-a").with_environment(env_name, config)
    }

    #[test]
    fn minimal_record_is_valid() {
        let result = validate(&record("development", env(1)));
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn key_names_are_checked() {
        let policy = ValidationPolicy::default();
        assert!(policy.validate_key(&RecordKey::new("orders", "team-a")).valid);

        let result = policy.validate_key(&RecordKey::new("", "Team_A!"));
        assert!(result.errors.iter().any(|e| e.contains("Application name is required")));
        assert!(result.errors.iter().any(|e| e.contains("must be a lowercase DNS label")));
    }

    #[test]
    fn reserved_namespaces_are_rejected() {
        for namespace in RESERVED_NAMESPACES {
            let result = validate(&ConfigurationRecord::new("orders", namespace));
            assert!(!result.valid);
            assert!(result.errors.iter().any(|e| e.contains("is reserved")));
        }
    }

    #[test]
    fn missing_names_are_errors() {
        let result = validate(&ConfigurationRecord::new("", ""));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("Application name is required")));
        assert!(result.errors.iter().any(|e| e.contains("Namespace is required")));
        assert!(result.warnings.iter().any(|w| w.contains("No environments configured")));
    }

    #[test]
    fn uppercase_application_is_rejected() {
        let result = validate(&ConfigurationRecord::new("Orders", "team-a"));
        assert!(result.errors.iter().any(|e| e.starts_with("application:")));
    }

    #[test]
    fn min_replicas_above_max_is_error() {
        let mut cfg = env(3);
        cfg.scaling = Some(ScalingConfig {
            enabled: true,
            min_replicas: 5,
            max_replicas: 2,
            ..ScalingConfig::default()
        });
        let result = ValidationPolicy::default().validate_environment("staging", &cfg);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("minReplicas (5) exceeds maxReplicas (2)")));
    }

    #[test]
    fn replicas_must_sit_inside_enabled_autoscaling_range() {
        let mut cfg = env(12);
        cfg.scaling = Some(ScalingConfig {
            enabled: true,
            min_replicas: 2,
            max_replicas: 10,
            ..ScalingConfig::default()
        });
        let result = ValidationPolicy::default().validate_environment("staging", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("outside the autoscaling range")));

        cfg.scaling.as_mut().unwrap().enabled = false;
        let result = ValidationPolicy::default().validate_environment("staging", &cfg);
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn utilization_targets_must_be_percentages() {
        let mut cfg = env(2);
        cfg.scaling = Some(ScalingConfig {
            target_cpu_utilization: 0,
            target_memory_utilization: Some(101),
            ..ScalingConfig::default()
        });
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert_eq!(result.errors.len(), 2, "{:?}", result.errors);
    }

    #[test]
    fn production_with_one_replica_warns_only() {
        let result = ValidationPolicy::default().validate_environment("production", &env(1));
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("production environment runs 1 replica")));

        let staging = ValidationPolicy::default().validate_environment("staging", &env(1));
        assert!(staging.warnings.is_empty());
    }

    #[test]
    fn production_rule_skipped_when_autoscaling() {
        let mut cfg = env(1);
        cfg.scaling = Some(ScalingConfig {
            enabled: true,
            ..ScalingConfig::default()
        });
        let result = ValidationPolicy::default().validate_environment("production", &cfg);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn request_above_limit_is_error() {
        let cfg = EnvironmentConfig::new(
            1,
            ResourceQuantities::new("2", "1Gi"),
            ResourceQuantities::new("500m", "512Mi"),
        );
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("requests.cpu: request 2 exceeds limit 500m")));
        assert!(result.errors.iter().any(|e| e.contains("requests.memory")));
    }

    #[test]
    fn missing_and_malformed_quantities_are_errors() {
        let cfg = EnvironmentConfig::new(
            1,
            ResourceQuantities::new("", "lots"),
            ResourceQuantities::new("500m", "512Mi"),
        );
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("requests.cpu: is required")));
        assert!(result.errors.iter().any(|e| e.contains("invalid memory quantity 'lots'")));
    }

    #[test]
    fn policy_limits_apply() {
        let policy = ValidationPolicy {
            max_cpu_millis: 250,
            ..ValidationPolicy::default()
        };
        let result = policy.validate_environment("dev", &env(1));
        assert!(result.errors.iter().any(|e| e.contains("limits.cpu: 500m exceeds the maximum of 250m")));
    }

    #[test]
    fn duplicate_and_invalid_env_names() {
        let mut cfg = env(1);
        cfg.environment = serde_json::from_str(r#"{"A":"1","A":"2","1BAD":"x"}"#).unwrap();
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("duplicate name 'A'")));
        assert!(result.errors.iter().any(|e| e.contains("'1BAD' is not a valid")));
    }

    #[test]
    fn secrets_need_references() {
        let mut cfg = env(1);
        cfg.environment.insert("DB_PASSWORD", "plain");
        cfg.secrets.insert("DB_PASSWORD", "orders-db/password");
        cfg.secrets.insert("API_KEY", " ");
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("secrets.API_KEY: secret reference")));
        assert!(result.warnings.iter().any(|w| w.contains("secrets.DB_PASSWORD")));
    }

    #[test]
    fn tls_requires_host() {
        let mut cfg = env(1);
        cfg.ingress = Some(IngressConfig {
            enabled: true,
            tls: true,
            ..IngressConfig::default()
        });
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("ingress.host: is required when tls")));

        cfg.ingress.as_mut().unwrap().host = Some("orders.example.com".into());
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn ingress_path_must_be_absolute() {
        let mut cfg = env(1);
        cfg.ingress = Some(IngressConfig {
            path: "api".into(),
            ..IngressConfig::default()
        });
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("ingress.path")));
    }

    #[test]
    fn database_and_cache_enums() {
        let mut cfg = env(1);
        cfg.database = Some(DatabaseConfig {
            kind: "oracle".into(),
            size: "small".into(),
            storage: "10Gi".into(),
            version: None,
        });
        cfg.cache = Some(CacheConfig {
            kind: "redis".into(),
            size: "huge".into(),
            nodes: 0,
        });
        let result = ValidationPolicy::default().validate_environment("dev", &cfg);
        assert!(result.errors.iter().any(|e| e.contains("database.type: 'oracle' is not one of")));
        assert!(result.errors.iter().any(|e| e.contains("cache.size: 'huge'")));
        assert!(result.errors.iter().any(|e| e.contains("cache.nodes")));
    }

    #[test]
    fn global_block_rules() {
        let mut rec = record("development", env(1));
        let mut global = GlobalConfig::default();
        global.security.pod_security_policy = "open".into();
        global.backup.schedule = "daily".into();
        global.backup.retention = "forever".into();
        rec.global = Some(global);
        let result = validate(&rec);
        assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
    }

    #[test]
    fn validation_is_deterministic() {
        let mut cfg = env(0);
        cfg.database = Some(DatabaseConfig::new(DatabaseType::Mysql, SizeTier::Large));
        let rec = record("production", cfg);
        assert_eq!(validate(&rec), validate(&rec));
    }

    #[test]
    fn label_and_hostname_helpers() {
        assert!(is_dns_label("team-a"));
        assert!(!is_dns_label("-team"));
        assert!(!is_dns_label("Team"));
        assert!(is_hostname("*.example.com"));
        assert!(!is_hostname("exa mple.com"));
        assert!(is_retention("30d"));
        assert!(!is_retention("d"));
    }
}
