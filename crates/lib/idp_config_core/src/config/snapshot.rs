// @awa-component: CFG-Snapshot
//
//! JSON export and import of the whole version store.
//!
//! Each environment's log is captured under its own read lock, so every
//! lineage in a snapshot is internally consistent. Snapshots are meant to
//! be taken when no writers are active (e.g. on shutdown).

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::store::{RecordEntry, VersionStore};
use super::{ConfigError, EnvKey, RecordKey};
use crate::models::config::GlobalConfig;
use crate::models::version::Version;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub format_version: u32,
    pub taken_at: DateTime<Utc>,
    pub records: Vec<RecordSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSnapshot {
    pub application: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalConfig>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Environment name → versions, oldest first.
    #[serde(default)]
    pub environments: BTreeMap<String, Vec<Version>>,
}

impl VersionStore {
    /// Export every record with its full history.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let entries: Vec<(RecordKey, RecordEntry)> = self
            .records
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let mut records = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            let mut environments = BTreeMap::new();
            for environment in &entry.environments {
                let Some(slot) = self
                    .slots
                    .get(&key.env(environment.clone()))
                    .map(|s| s.value().clone())
                else {
                    continue;
                };
                let log = slot.log.read().await;
                environments.insert(
                    environment.clone(),
                    log.iter().map(|v| v.as_ref().clone()).collect(),
                );
            }
            records.push(RecordSnapshot {
                application: key.application,
                namespace: key.namespace,
                global: entry.global,
                labels: entry.labels,
                created_at: entry.created_at,
                updated_at: entry.updated_at,
                environments,
            });
        }
        records.sort_by(|a, b| {
            (&a.namespace, &a.application).cmp(&(&b.namespace, &b.application))
        });

        StoreSnapshot {
            format_version: FORMAT_VERSION,
            taken_at: Utc::now(),
            records,
        }
    }

    /// Load a snapshot into an empty store. Returns the number of records.
    ///
    /// The snapshot is checked in full before anything is installed.
    pub fn restore(&self, snapshot: StoreSnapshot) -> Result<usize, ConfigError> {
        if !self.records.is_empty() {
            return Err(ConfigError::Snapshot(
                "cannot restore into a non-empty store".to_string(),
            ));
        }
        check_snapshot(&snapshot)?;

        let count = snapshot.records.len();
        for record in snapshot.records {
            let key = RecordKey::new(record.application, record.namespace);
            let mut names = BTreeSet::new();
            for (environment, versions) in record.environments {
                self.install(EnvKey::new(&key.application, &key.namespace, &environment), versions);
                names.insert(environment);
            }
            self.records.insert(
                key,
                RecordEntry {
                    global: record.global,
                    labels: record.labels,
                    environments: names,
                    created_at: record.created_at,
                    updated_at: record.updated_at,
                },
            );
        }
        info!(records = count, "store restored from snapshot");
        Ok(count)
    }
}

/// Write the store to `path` as JSON, replacing any previous file.
pub async fn save_to_file(store: &VersionStore, path: &Path) -> Result<(), ConfigError> {
    let snapshot = store.snapshot().await;
    let json = serde_json::to_vec_pretty(&snapshot)
        .map_err(|e| ConfigError::Snapshot(format!("encode: {e}")))?;

    let tmp = path.with_extension("tmp");
    let written = match tokio::fs::write(&tmp, json).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    written.map_err(|e| ConfigError::Snapshot(format!("write {}: {e}", path.display())))?;

    info!(path = %path.display(), records = snapshot.records.len(), "snapshot written");
    Ok(())
}

/// Restore the store from `path`. A missing file restores nothing.
pub fn load_from_file(store: &VersionStore, path: &Path) -> Result<usize, ConfigError> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(0);
        }
        Err(e) => {
            return Err(ConfigError::Snapshot(format!("read {}: {e}", path.display())));
        }
    };
    let snapshot: StoreSnapshot = serde_json::from_slice(&raw)
        .map_err(|e| ConfigError::Snapshot(format!("decode {}: {e}", path.display())))?;
    store.restore(snapshot)
}

fn check_snapshot(snapshot: &StoreSnapshot) -> Result<(), ConfigError> {
    if snapshot.format_version != FORMAT_VERSION {
        return Err(ConfigError::Snapshot(format!(
            "unsupported format version {}",
            snapshot.format_version
        )));
    }

    let mut seen = BTreeSet::new();
    for record in &snapshot.records {
        let key = RecordKey::new(record.application.clone(), record.namespace.clone());
        if record.application.is_empty() || record.namespace.is_empty() {
            return Err(ConfigError::Snapshot(format!("record {key} has an empty name")));
        }
        if !seen.insert(key.clone()) {
            return Err(ConfigError::Snapshot(format!("record {key} appears twice")));
        }
        for (environment, versions) in &record.environments {
            if versions.is_empty() {
                return Err(ConfigError::Snapshot(format!(
                    "{key}/{environment} has no versions"
                )));
            }
            for (idx, version) in versions.iter().enumerate() {
                if version.version_number != idx as u64 + 1 || version.environment != *environment {
                    return Err(ConfigError::Snapshot(format!(
                        "{key}/{environment} history is not numbered 1..={}",
                        versions.len()
                    )));
                }
            }
        }
    }
    Ok(())
}
