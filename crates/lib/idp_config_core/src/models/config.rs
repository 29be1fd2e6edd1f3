// @awa-component: CFG-Schema
//
//! Configuration domain models.
//!
//! Shapes of a [`ConfigurationRecord`] and its per-environment
//! [`EnvironmentConfig`] entries, as accepted from API consumers and stored
//! by the version store. Fields that a form may leave empty default on
//! input so that the validator, not the deserializer, reports them.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Name → value maps
// ---------------------------------------------------------------------------

/// Name → value map for environment variables and secret references.
///
/// Unlike a `BTreeMap`, duplicate names seen on input are kept so the
/// validator can report them instead of silently keeping the last one.
/// Serialization always emits names in sorted order.
#[derive(Debug, Clone, Default)]
pub struct EnvMap {
    entries: Vec<(String, String)>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing every existing entry with that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let previous = self.get(&name).map(str::to_string);
        self.entries.retain(|(n, _)| *n != name);
        self.entries.push((name, value.into()));
        previous
    }

    /// Value for `name`; the last occurrence wins when duplicated.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in input order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names that occur more than once, sorted and deduplicated.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (name, _) in &self.entries {
            *counts.entry(name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect()
    }

    /// Sorted view; the last occurrence of a duplicated name wins.
    pub fn to_sorted(&self) -> BTreeMap<String, String> {
        self.entries.iter().cloned().collect()
    }

    fn sorted_entries(&self) -> Vec<&(String, String)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort();
        entries
    }
}

impl PartialEq for EnvMap {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_entries() == other.sorted_entries()
    }
}

impl Eq for EnvMap {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for EnvMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted = self.to_sorted();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (name, value) in &sorted {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EnvMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnvMapVisitor;

        impl<'de> Visitor<'de> for EnvMapVisitor {
            type Value = EnvMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of names to scalar values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<EnvMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, ScalarString>()? {
                    entries.push((name, value.0));
                }
                Ok(EnvMap { entries })
            }

            fn visit_unit<E>(self) -> Result<EnvMap, E>
            where
                E: de::Error,
            {
                Ok(EnvMap::default())
            }
        }

        deserializer.deserialize_any(EnvMapVisitor)
    }
}

/// A scalar (string, number or bool) read as its string form.
///
/// YAML and form payloads routinely send `PORT: 8080`; the value is an
/// environment variable and so always a string once stored.
struct ScalarString(String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = ScalarString;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number, or bool")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<ScalarString, E> {
                Ok(ScalarString(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<ScalarString, E> {
                Ok(ScalarString(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<ScalarString, E> {
                Ok(ScalarString(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<ScalarString, E> {
                Ok(ScalarString(value.to_string()))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<ScalarString, E> {
                Ok(ScalarString(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<ScalarString, E> {
                Ok(ScalarString(value))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Supported managed database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    Postgresql,
    Mysql,
    Redis,
    Mongodb,
}

impl DatabaseType {
    pub const ALL: [DatabaseType; 4] = [
        DatabaseType::Postgresql,
        DatabaseType::Mysql,
        DatabaseType::Redis,
        DatabaseType::Mongodb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::Postgresql => "postgresql",
            DatabaseType::Mysql => "mysql",
            DatabaseType::Redis => "redis",
            DatabaseType::Mongodb => "mongodb",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Supported managed cache engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheType {
    Redis,
    Memcached,
}

impl CacheType {
    pub const ALL: [CacheType; 2] = [CacheType::Redis, CacheType::Memcached];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Redis => "redis",
            CacheType::Memcached => "memcached",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Instance size tier for databases and caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeTier {
    Small,
    Medium,
    Large,
}

impl SizeTier {
    pub const ALL: [SizeTier; 3] = [SizeTier::Small, SizeTier::Medium, SizeTier::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Small => "small",
            SizeTier::Medium => "medium",
            SizeTier::Large => "large",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(DatabaseType, CacheType, SizeTier);

// ---------------------------------------------------------------------------
// Environment configuration
// ---------------------------------------------------------------------------

/// CPU and memory quantities, e.g. `{ cpu: "250m", memory: "256Mi" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantities {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
}

impl ResourceQuantities {
    pub fn new(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            memory: memory.into(),
        }
    }
}

/// Resource requests and limits for one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default)]
    pub requests: ResourceQuantities,
    #[serde(default)]
    pub limits: ResourceQuantities,
}

/// Horizontal autoscaling parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "minReplicas", default = "default_min_replicas")]
    pub min_replicas: u32,
    #[serde(rename = "maxReplicas", default = "default_max_replicas")]
    pub max_replicas: u32,
    #[serde(rename = "targetCPUUtilization", default = "default_cpu_utilization")]
    pub target_cpu_utilization: u32,
    #[serde(
        rename = "targetMemoryUtilization",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_memory_utilization: Option<u32>,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_replicas: default_min_replicas(),
            max_replicas: default_max_replicas(),
            target_cpu_utilization: default_cpu_utilization(),
            target_memory_utilization: None,
        }
    }
}

fn default_min_replicas() -> u32 {
    1
}

fn default_max_replicas() -> u32 {
    10
}

fn default_cpu_utilization() -> u32 {
    70
}

/// Ingress exposure for the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default = "default_ingress_path")]
    pub path: String,
    #[serde(default)]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
            path: default_ingress_path(),
            tls: false,
            annotations: BTreeMap::new(),
        }
    }
}

fn default_ingress_path() -> String {
    "/".to_string()
}

/// Managed database descriptor.
///
/// `type` and `size` are kept as strings so that unknown values surface as
/// validation errors; see [`DatabaseType::parse`] and [`SizeTier::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub size: String,
    #[serde(default = "default_storage")]
    pub storage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl DatabaseConfig {
    pub fn new(kind: DatabaseType, size: SizeTier) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            size: size.as_str().to_string(),
            storage: default_storage(),
            version: None,
        }
    }
}

fn default_storage() -> String {
    "10Gi".to_string()
}

/// Managed cache descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub size: String,
    #[serde(default = "default_cache_nodes")]
    pub nodes: u32,
}

impl CacheConfig {
    pub fn new(kind: CacheType, size: SizeTier) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            size: size.as_str().to_string(),
            nodes: default_cache_nodes(),
        }
    }
}

fn default_cache_nodes() -> u32 {
    1
}

/// Configuration of one environment, the unit of versioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    #[serde(default)]
    pub resources: ResourceRequirements,
    /// Plain environment variables.
    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub environment: EnvMap,
    /// Environment variable name → external secret reference. Never values.
    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub secrets: EnvMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<ScalingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<IngressConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

fn default_replicas() -> u32 {
    1
}

impl EnvironmentConfig {
    /// A minimal config with the given replica count and resources.
    pub fn new(replicas: u32, requests: ResourceQuantities, limits: ResourceQuantities) -> Self {
        Self {
            replicas,
            resources: ResourceRequirements { requests, limits },
            environment: EnvMap::new(),
            secrets: EnvMap::new(),
            scaling: None,
            ingress: None,
            database: None,
            cache: None,
        }
    }

    /// Whether horizontal autoscaling is switched on.
    pub fn autoscaling_enabled(&self) -> bool {
        self.scaling.as_ref().is_some_and(|s| s.enabled)
    }
}

// ---------------------------------------------------------------------------
// Global configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub alerts: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alerts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(rename = "networkPolicies", default = "default_true")]
    pub network_policies: bool,
    /// One of `privileged`, `baseline`, `restricted`.
    #[serde(rename = "podSecurityPolicy", default = "default_pod_security")]
    pub pod_security_policy: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            network_policies: true,
            pod_security_policy: default_pod_security(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression.
    #[serde(default = "default_backup_schedule")]
    pub schedule: String,
    #[serde(default = "default_backup_retention")]
    pub retention: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_backup_schedule(),
            retention: default_backup_retention(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pod_security() -> String {
    "restricted".to_string()
}

fn default_backup_schedule() -> String {
    "0 2 * * *".to_string()
}

fn default_backup_retention() -> String {
    "30d".to_string()
}

/// Monitoring, security and backup toggles shared by all environments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Configuration of one application in one namespace, across environments.
///
/// When returned from the store, `environments` holds the current
/// (highest-version) config of every environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ConfigurationRecord {
    pub fn new(application: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            namespace: namespace.into(),
            environments: BTreeMap::new(),
            global: None,
            labels: BTreeMap::new(),
        }
    }

    /// Builder-style helper to add an environment.
    pub fn with_environment(mut self, name: impl Into<String>, config: EnvironmentConfig) -> Self {
        self.environments.insert(name.into(), config);
        self
    }
}
