// @awa-component: CFG-DiffEngine
//
//! Structural diff of environment configs.
//!
//! Both sides are flattened to `path → leaf value` maps and compared. Output
//! entries are ordered lexicographically by path so assertions and UI
//! rendering are deterministic. Absent optional blocks and absent fields
//! are the same thing: a missing leaf.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::VersionStore;
use super::{ConfigError, EnvKey, RecordKey};
use crate::models::config::EnvironmentConfig;

/// Change at one field path, described from side A to side B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Present in B only.
    Added { value: Value },
    /// Present in A only.
    Removed { value: Value },
    /// Present in both with different values.
    Changed { old: Value, new: Value },
}

impl Change {
    /// The same change seen from the other side.
    pub fn reversed(&self) -> Change {
        match self {
            Change::Added { value } => Change::Removed {
                value: value.clone(),
            },
            Change::Removed { value } => Change::Added {
                value: value.clone(),
            },
            Change::Changed { old, new } => Change::Changed {
                old: new.clone(),
                new: old.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub path: String,
    #[serde(flatten)]
    pub change: Change,
}

/// Ordered set of field-level changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub entries: Vec<DiffEntry>,
}

impl ConfigDiff {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Change at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&Change> {
        self.entries
            .binary_search_by(|e| e.path.as_str().cmp(path))
            .ok()
            .map(|idx| &self.entries[idx].change)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Counts of (added, removed, changed) entries.
    pub fn counts(&self) -> (usize, usize, usize) {
        self.entries
            .iter()
            .fold((0, 0, 0), |(a, r, c), e| match e.change {
                Change::Added { .. } => (a + 1, r, c),
                Change::Removed { .. } => (a, r + 1, c),
                Change::Changed { .. } => (a, r, c + 1),
            })
    }
}

/// Diff two configs.
pub fn diff(a: &EnvironmentConfig, b: &EnvironmentConfig) -> ConfigDiff {
    diff_optional(Some(a), Some(b))
}

/// Diff where either side may be missing; a missing side has no fields.
pub fn diff_optional(a: Option<&EnvironmentConfig>, b: Option<&EnvironmentConfig>) -> ConfigDiff {
    let left = a.map(flatten_config).unwrap_or_default();
    let mut right = b.map(flatten_config).unwrap_or_default();

    let mut entries = Vec::new();
    for (path, old) in left {
        let change = match right.remove(&path) {
            Some(new) if new == old => continue,
            Some(new) => Change::Changed { old, new },
            None => Change::Removed { value: old },
        };
        entries.push(DiffEntry { path, change });
    }
    entries.extend(right.into_iter().map(|(path, value)| DiffEntry {
        path,
        change: Change::Added { value },
    }));
    entries.sort_by(|x, y| x.path.cmp(&y.path));

    ConfigDiff { entries }
}

/// Compare the current configs of two environments of one record.
pub async fn compare_environments(
    store: &VersionStore,
    record: &RecordKey,
    env_a: &str,
    env_b: &str,
) -> Result<ConfigDiff, ConfigError> {
    let a = store.get(&record.env(env_a)).await?;
    let b = store.get(&record.env(env_b)).await?;
    Ok(diff(&a, &b))
}

/// Compare two historical versions of one environment.
pub async fn compare_versions(
    store: &VersionStore,
    key: &EnvKey,
    from: u64,
    to: u64,
) -> Result<ConfigDiff, ConfigError> {
    let a = store.version(key, from).await?;
    let b = store.version(key, to).await?;
    Ok(diff(&a.config, &b.config))
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn flatten_config(config: &EnvironmentConfig) -> BTreeMap<String, Value> {
    // Plain structs with string-keyed maps always serialize.
    let value = serde_json::to_value(config).unwrap_or_default();
    let mut out = BTreeMap::new();
    flatten_into(&mut out, String::new(), value);
    out
}

fn flatten_into(out: &mut BTreeMap<String, Value>, path: String, value: Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(out, join_path(&path, &key), child);
            }
        }
        leaf => {
            out.insert(path, leaf);
        }
    }
}

/// Append a segment; keys that would be ambiguous in dotted form (e.g.
/// annotation names) are bracket-quoted.
fn join_path(parent: &str, key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    match (parent.is_empty(), plain) {
        (true, true) => key.to_string(),
        (false, true) => format!("{parent}.{key}"),
        (_, false) => format!("{parent}[{}]", Value::String(key.to_string())),
    }
}
