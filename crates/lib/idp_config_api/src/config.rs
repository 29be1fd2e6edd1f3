//! API server configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use idp_config_core::config::quantity::{parse_cpu_millis, parse_memory_bytes};
use idp_config_core::config::validation::ValidationPolicy;
use idp_config_core::models::version::DIRECT_AUTHOR;
use tracing::warn;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3200").
    pub bind_addr: String,
    /// Directory of extra YAML templates.
    pub templates_dir: Option<PathBuf>,
    /// JSON snapshot loaded at startup and written on shutdown.
    pub state_file: Option<PathBuf>,
    /// Identity recorded when a request carries no `X-Author` header.
    pub default_author: String,
    /// Upper bound on waiting for store locks, in milliseconds. 0 disables it.
    pub lock_timeout_ms: u64,
    /// Validation rules enforced on every write.
    pub policy: ValidationPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3200".into(),
            templates_dir: None,
            state_file: None,
            default_author: DIRECT_AUTHOR.into(),
            lock_timeout_ms: 5000,
            policy: ValidationPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                          | Default          |
    /// |-----------------------------------|------------------|
    /// | `BIND_ADDR`                       | `127.0.0.1:3200` |
    /// | `TEMPLATES_DIR`                   | unset            |
    /// | `STATE_FILE`                      | unset            |
    /// | `DEFAULT_AUTHOR`                  | `api`            |
    /// | `LOCK_TIMEOUT_MS`                 | `5000`           |
    /// | `POLICY_MAX_REPLICAS`             | `100`            |
    /// | `POLICY_MAX_CPU`                  | `16`             |
    /// | `POLICY_MAX_MEMORY`               | `64Gi`           |
    /// | `POLICY_PRODUCTION_MIN_REPLICAS`  | `2`              |
    /// | `POLICY_PRODUCTION_ENVIRONMENTS`  | `production`     |
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let default_policy = defaults.policy;
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let policy = ValidationPolicy {
            max_replicas: parsed(var("POLICY_MAX_REPLICAS"), "POLICY_MAX_REPLICAS")
                .unwrap_or(default_policy.max_replicas),
            max_cpu_millis: quantity(var("POLICY_MAX_CPU"), "POLICY_MAX_CPU", parse_cpu_millis)
                .unwrap_or(default_policy.max_cpu_millis),
            max_memory_bytes: quantity(
                var("POLICY_MAX_MEMORY"),
                "POLICY_MAX_MEMORY",
                parse_memory_bytes,
            )
            .unwrap_or(default_policy.max_memory_bytes),
            production_min_replicas: parsed(
                var("POLICY_PRODUCTION_MIN_REPLICAS"),
                "POLICY_PRODUCTION_MIN_REPLICAS",
            )
            .unwrap_or(default_policy.production_min_replicas),
            production_environments: var("POLICY_PRODUCTION_ENVIRONMENTS")
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(default_policy.production_environments),
        };

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            templates_dir: var("TEMPLATES_DIR").map(PathBuf::from),
            state_file: var("STATE_FILE").map(PathBuf::from),
            default_author: var("DEFAULT_AUTHOR").unwrap_or(defaults.default_author),
            lock_timeout_ms: parsed(var("LOCK_TIMEOUT_MS"), "LOCK_TIMEOUT_MS")
                .unwrap_or(defaults.lock_timeout_ms),
            policy,
        }
    }

    /// Lock-wait bound applied to every write.
    pub fn lock_timeout(&self) -> Option<Duration> {
        (self.lock_timeout_ms > 0).then(|| Duration::from_millis(self.lock_timeout_ms))
    }
}

fn parsed<T: FromStr>(raw: Option<String>, name: &str) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparseable value");
            None
        }
    }
}

fn quantity<T>(raw: Option<String>, name: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw?;
    let value = parse(&raw);
    if value.is_none() {
        warn!(variable = name, value = %raw, "ignoring unparseable quantity");
    }
    value
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ApiConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]);
        assert_eq!(c.bind_addr, "127.0.0.1:3200");
        assert_eq!(c.default_author, "api");
        assert_eq!(c.lock_timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(c.policy, ValidationPolicy::default());
        assert!(c.templates_dir.is_none() && c.state_file.is_none());
    }

    #[test]
    fn policy_knobs_are_read() {
        let c = config(&[
            ("POLICY_MAX_REPLICAS", "20"),
            ("POLICY_MAX_CPU", "4"),
            ("POLICY_MAX_MEMORY", "8Gi"),
            ("POLICY_PRODUCTION_MIN_REPLICAS", "3"),
            ("POLICY_PRODUCTION_ENVIRONMENTS", "production, prod-eu ,"),
            ("LOCK_TIMEOUT_MS", "0"),
        ]);
        assert_eq!(c.policy.max_replicas, 20);
        assert_eq!(c.policy.max_cpu_millis, 4000);
        assert_eq!(c.policy.max_memory_bytes, 8 * 1024 * 1024 * 1024);
        assert_eq!(c.policy.production_min_replicas, 3);
        assert_eq!(c.policy.production_environments, vec!["production", "prod-eu"]);
        assert_eq!(c.lock_timeout(), None);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let c = config(&[("POLICY_MAX_REPLICAS", "lots"), ("POLICY_MAX_MEMORY", "huge")]);
        assert_eq!(c.policy.max_replicas, 100);
        assert_eq!(c.policy.max_memory_bytes, ValidationPolicy::default().max_memory_bytes);
    }
}
