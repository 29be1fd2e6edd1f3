// @awa-component: CFG-VersionStore
//
//! Append-only version store.
//!
//! Each `(application, namespace, environment)` key owns an ordered log of
//! [`Version`]s; the current config is always the last element, never a
//! separately stored pointer.
//!
//! Locking, outermost first:
//!
//! 1. a per-record gate (`RwLock<()>`): writers share it, `delete` takes it
//!    exclusively so a record never loses environments mid-write;
//! 2. a per-environment writer mutex held across validate-then-append, which
//!    keeps version numbers gap-free under concurrent writers. A write
//!    touching several environments takes all of them, in name order,
//!    before validating;
//! 3. the log's own `RwLock`, held only for the push itself, so readers see
//!    a version either fully formed or not at all.
//!
//! Reads never touch (1) or (2).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, MutexGuard, OwnedRwLockReadGuard, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::validation::{ValidationPolicy, ValidationResult};
use super::{ConfigError, EnvKey, RecordKey};
use crate::models::config::{ConfigurationRecord, EnvironmentConfig, GlobalConfig};
use crate::models::version::Version;

/// Per-write options beyond the provenance string.
#[derive(Debug, Clone, Default)]
pub struct WriteContext {
    /// Identity supplied by the caller, recorded verbatim.
    pub requested_by: Option<String>,
    /// Upper bound on waiting for locks. Once the locks are held the write
    /// always runs to completion.
    pub timeout: Option<Duration>,
}

impl WriteContext {
    pub fn requested_by(identity: impl Into<String>) -> Self {
        Self {
            requested_by: Some(identity.into()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Record-level metadata carried by [`VersionStore::create`] and
/// [`VersionStore::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMeta {
    pub global: Option<GlobalConfig>,
    pub labels: BTreeMap<String, String>,
}

enum Commit {
    Create(RecordMeta),
    Update(RecordMeta),
    Append,
}

/// Version log of one environment.
#[derive(Default)]
pub(crate) struct EnvSlot {
    pub(crate) writer: Mutex<()>,
    pub(crate) log: RwLock<Vec<Arc<Version>>>,
}

/// Record-level metadata. Last-write-wins, not versioned.
#[derive(Debug, Clone)]
pub(crate) struct RecordEntry {
    pub(crate) global: Option<GlobalConfig>,
    pub(crate) labels: BTreeMap<String, String>,
    pub(crate) environments: BTreeSet<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl RecordEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            global: None,
            labels: BTreeMap::new(),
            environments: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// In-memory, concurrency-safe store of configuration versions.
pub struct VersionStore {
    pub(crate) slots: DashMap<EnvKey, Arc<EnvSlot>>,
    pub(crate) records: DashMap<RecordKey, RecordEntry>,
    gates: DashMap<RecordKey, Arc<RwLock<()>>>,
    policy: RwLock<Arc<ValidationPolicy>>,
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}

impl VersionStore {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            slots: DashMap::new(),
            records: DashMap::new(),
            gates: DashMap::new(),
            policy: RwLock::new(Arc::new(policy)),
        }
    }

    // -----------------------------------------------------------------------
    // Policy
    // -----------------------------------------------------------------------

    /// The validation policy currently enforced on writes.
    pub async fn policy(&self) -> Arc<ValidationPolicy> {
        self.policy.read().await.clone()
    }

    /// Replace the validation policy. Existing versions are not re-checked;
    /// subsequent writes (including rollbacks) are.
    pub async fn set_policy(&self, policy: ValidationPolicy) {
        *self.policy.write().await = Arc::new(policy);
        info!("validation policy replaced");
    }

    /// Validate a record against the current policy without writing.
    pub async fn validate_record(&self, record: &ConfigurationRecord) -> ValidationResult {
        self.policy().await.validate_record(record)
    }

    /// Validate one environment config against the current policy.
    pub async fn validate_environment(
        &self,
        environment: &str,
        config: &EnvironmentConfig,
    ) -> ValidationResult {
        self.policy().await.validate_environment(environment, config)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Current config of an environment.
    pub async fn get(&self, key: &EnvKey) -> Result<EnvironmentConfig, ConfigError> {
        Ok(self.current_version(key).await?.config)
    }

    /// Highest-numbered version of an environment.
    pub async fn current_version(&self, key: &EnvKey) -> Result<Version, ConfigError> {
        debug!(key = %key, "reading current version");
        let slot = self.existing_slot(key)?;
        let log = slot.log.read().await;
        log.last()
            .map(|v| v.as_ref().clone())
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    /// A specific historical version.
    pub async fn version(&self, key: &EnvKey, version_number: u64) -> Result<Version, ConfigError> {
        let not_found = || ConfigError::VersionNotFound {
            environment: key.environment.clone(),
            version: version_number,
        };
        let slot = self
            .slots
            .get(key)
            .map(|s| s.value().clone())
            .ok_or_else(not_found)?;
        let log = slot.log.read().await;
        // Numbers are gap-free from 1, so the number is the index + 1.
        version_number
            .checked_sub(1)
            .and_then(|idx| log.get(idx as usize))
            .map(|v| v.as_ref().clone())
            .ok_or_else(not_found)
    }

    /// All versions of an environment, newest first.
    pub async fn history(&self, key: &EnvKey) -> Result<Vec<Version>, ConfigError> {
        debug!(key = %key, "reading history");
        let slot = self.existing_slot(key)?;
        let log = slot.log.read().await;
        if log.is_empty() {
            return Err(ConfigError::NotFound(key.to_string()));
        }
        Ok(log.iter().rev().map(|v| v.as_ref().clone()).collect())
    }

    /// Whether a record exists.
    pub fn exists(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }

    /// Names of the environments a record has history for, sorted.
    pub fn environments(&self, key: &RecordKey) -> Result<Vec<String>, ConfigError> {
        self.records
            .get(key)
            .map(|entry| entry.environments.iter().cloned().collect())
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    /// Current view of a record: every environment at its latest version.
    pub async fn get_record(&self, key: &RecordKey) -> Result<ConfigurationRecord, ConfigError> {
        let entry = self
            .records
            .get(key)
            .map(|e| e.value().clone())
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;

        let mut record = ConfigurationRecord::new(key.application.clone(), key.namespace.clone());
        record.global = entry.global;
        record.labels = entry.labels;

        for environment in entry.environments {
            let Some(slot) = self
                .slots
                .get(&key.env(environment.clone()))
                .map(|s| s.value().clone())
            else {
                continue;
            };
            let log = slot.log.read().await;
            if let Some(latest) = log.last() {
                record.environments.insert(environment, latest.config.clone());
            }
        }
        Ok(record)
    }

    /// Current view of every record, optionally filtered by namespace,
    /// ordered by namespace then application.
    pub async fn list(&self, namespace: Option<&str>) -> Vec<ConfigurationRecord> {
        let mut keys: Vec<RecordKey> = self
            .records
            .iter()
            .filter(|e| namespace.is_none_or(|ns| e.key().namespace == ns))
            .map(|e| e.key().clone())
            .collect();
        keys.sort_by(|a, b| {
            (&a.namespace, &a.application).cmp(&(&b.namespace, &b.application))
        });

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            // A record deleted since the scan above is skipped.
            if let Ok(record) = self.get_record(&key).await {
                records.push(record);
            }
        }
        records
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Validate `config` for `key.environment` and append it as a new version.
    pub async fn put(
        &self,
        key: &EnvKey,
        config: EnvironmentConfig,
        author: &str,
    ) -> Result<Version, ConfigError> {
        self.put_with(key, config, author, &WriteContext::default())
            .await
    }

    /// [`put`](Self::put) with caller identity and a lock-wait deadline.
    pub async fn put_with(
        &self,
        key: &EnvKey,
        config: EnvironmentConfig,
        author: &str,
        ctx: &WriteContext,
    ) -> Result<Version, ConfigError> {
        let environments = BTreeMap::from([(key.environment.clone(), config)]);
        self.commit(&key.record(), Commit::Append, environments, author, ctx)
            .await?
            .pop()
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    /// Create a record with its metadata; every environment lands as
    /// version 1. Fails with [`ConfigError::AlreadyExists`] if the record
    /// has any history or metadata. Nothing is written on error.
    pub async fn create(
        &self,
        key: &RecordKey,
        meta: RecordMeta,
        environments: BTreeMap<String, EnvironmentConfig>,
        author: &str,
        ctx: &WriteContext,
    ) -> Result<Vec<Version>, ConfigError> {
        self.commit(key, Commit::Create(meta), environments, author, ctx)
            .await
    }

    /// Replace an existing record's metadata and append a version for every
    /// given environment whose config differs from its current one.
    /// Nothing is written on error.
    pub async fn update(
        &self,
        key: &RecordKey,
        meta: RecordMeta,
        environments: BTreeMap<String, EnvironmentConfig>,
        author: &str,
        ctx: &WriteContext,
    ) -> Result<Vec<Version>, ConfigError> {
        self.commit(key, Commit::Update(meta), environments, author, ctx)
            .await
    }

    /// Remove a record and the history of all its environments.
    ///
    /// Deleting an absent record is a no-op. Returns whether anything was
    /// removed.
    pub async fn delete(&self, key: &RecordKey) -> bool {
        let gate = self.gate(key);
        let removed = {
            let _exclusive = gate.write().await;
            let removed = self.records.remove(key);
            if let Some((_, entry)) = &removed {
                for environment in &entry.environments {
                    self.slots.remove(&key.env(environment.clone()));
                }
            }
            removed
        };
        drop(gate);
        self.forget_gate(key);

        let Some((_, entry)) = removed else {
            debug!(record = %key, "delete of absent record");
            return false;
        };
        info!(
            record = %key,
            environments = entry.environments.len(),
            "configuration deleted"
        );
        true
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    async fn commit(
        &self,
        key: &RecordKey,
        commit: Commit,
        environments: BTreeMap<String, EnvironmentConfig>,
        author: &str,
        ctx: &WriteContext,
    ) -> Result<Vec<Version>, ConfigError> {
        let env_keys: Vec<EnvKey> = environments.keys().map(|e| key.env(e.clone())).collect();
        let outcome = self
            .commit_locked(key, commit, &env_keys, environments, author, ctx)
            .await;
        if outcome.is_err() {
            self.release_unused(key, &env_keys);
        }
        outcome
    }

    /// Lock, validate, then write. Every fallible step runs before the first
    /// mutation, so an error leaves the store as it was.
    async fn commit_locked(
        &self,
        key: &RecordKey,
        commit: Commit,
        env_keys: &[EnvKey],
        environments: BTreeMap<String, EnvironmentConfig>,
        author: &str,
        ctx: &WriteContext,
    ) -> Result<Vec<Version>, ConfigError> {
        let deadline = ctx.timeout.map(|t| Instant::now() + t);
        let _gate = self.enter_record(key, deadline).await?;

        match &commit {
            Commit::Create(_) if self.exists(key) => {
                return Err(ConfigError::AlreadyExists(key.to_string()));
            }
            Commit::Update(_) if !self.exists(key) => {
                return Err(ConfigError::NotFound(key.to_string()));
            }
            _ => {}
        }

        // Writers are taken in environment-name order, so overlapping
        // multi-environment writes cannot deadlock.
        let slots: Vec<Arc<EnvSlot>> = env_keys.iter().map(|k| self.slot(k)).collect();
        let mut writers = Vec::with_capacity(slots.len());
        for (env_key, slot) in env_keys.iter().zip(&slots) {
            writers.push(lock_writer(slot, env_key, deadline).await?);
        }

        let policy = self.policy().await;
        let mut verdict = policy.validate_key(key);
        let mut checked = Vec::with_capacity(slots.len());
        for (environment, config) in environments {
            let result = policy.validate_environment(&environment, &config);
            verdict.merge(result.clone());
            checked.push((environment, config, result.warnings));
        }
        if !verdict.valid {
            warn!(
                record = %key,
                author,
                errors = %verdict.summary(),
                "configuration write rejected"
            );
            return Err(ConfigError::ValidationError(verdict));
        }

        let now = Utc::now();
        let skip_unchanged = matches!(commit, Commit::Update(_));
        match commit {
            Commit::Create(meta) => match self.records.entry(key.clone()) {
                Entry::Occupied(_) => return Err(ConfigError::AlreadyExists(key.to_string())),
                Entry::Vacant(vacant) => {
                    let mut entry = RecordEntry::new(now);
                    entry.global = meta.global;
                    entry.labels = meta.labels;
                    vacant.insert(entry);
                }
            },
            Commit::Update(meta) => {
                let Some(mut entry) = self.records.get_mut(key) else {
                    return Err(ConfigError::NotFound(key.to_string()));
                };
                entry.global = meta.global;
                entry.labels = meta.labels;
                entry.updated_at = now;
            }
            Commit::Append => {}
        }

        // Past this point the write is committed to completing.
        let mut versions = Vec::with_capacity(checked.len());
        for ((environment, config, warnings), slot) in checked.into_iter().zip(&slots) {
            let mut log = slot.log.write().await;
            if skip_unchanged && log.last().is_some_and(|v| v.config == config) {
                debug!(record = %key, environment = %environment, "environment unchanged, no new version");
                continue;
            }
            let version = Version {
                environment: environment.clone(),
                version_number: log.last().map_or(1, |v| v.version_number + 1),
                config,
                author: author.to_string(),
                requested_by: ctx.requested_by.clone(),
                created_at: now,
                warnings,
            };
            log.push(Arc::new(version.clone()));
            drop(log);

            {
                let mut entry = self
                    .records
                    .entry(key.clone())
                    .or_insert_with(|| RecordEntry::new(now));
                entry.environments.insert(environment);
                entry.updated_at = now;
            }

            info!(
                record = %key,
                environment = %version.environment,
                version = version.version_number,
                author,
                warnings = version.warnings.len(),
                "configuration version recorded"
            );
            versions.push(version);
        }
        drop(writers);
        Ok(versions)
    }

    /// Drop the slots and gate a failed write created without using them.
    fn release_unused(&self, key: &RecordKey, env_keys: &[EnvKey]) {
        for env_key in env_keys {
            self.slots.remove_if(env_key, |_, slot| {
                Arc::strong_count(slot) == 1 && slot.log.try_read().is_ok_and(|log| log.is_empty())
            });
        }
        self.forget_gate(key);
    }

    /// Remove the gate of a record that no longer exists, unless someone
    /// still holds it.
    fn forget_gate(&self, key: &RecordKey) {
        self.gates.remove_if(key, |_, gate| {
            Arc::strong_count(gate) == 1 && !self.records.contains_key(key)
        });
    }

    fn existing_slot(&self, key: &EnvKey) -> Result<Arc<EnvSlot>, ConfigError> {
        // Clone the Arc so no DashMap shard lock is held across an await.
        self.slots
            .get(key)
            .map(|s| s.value().clone())
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    /// Slot for `key`, created on first use. Safe under concurrent first access.
    pub(crate) fn slot(&self, key: &EnvKey) -> Arc<EnvSlot> {
        self.slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(EnvSlot::default()))
            .clone()
    }

    fn gate(&self, key: &RecordKey) -> Arc<RwLock<()>> {
        self.gates
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    async fn enter_record(
        &self,
        key: &RecordKey,
        deadline: Option<Instant>,
    ) -> Result<OwnedRwLockReadGuard<()>, ConfigError> {
        let gate = self.gate(key);
        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, gate.read_owned())
                .await
                .map_err(|_| ConfigError::Timeout(format!("waiting to write {key}"))),
            None => Ok(gate.read_owned().await),
        }
    }

    /// Install a fully formed log for `key`. Only used when restoring a
    /// snapshot into a store.
    pub(crate) fn install(&self, key: EnvKey, versions: Vec<Version>) {
        let slot = EnvSlot {
            writer: Mutex::new(()),
            log: RwLock::new(versions.into_iter().map(Arc::new).collect()),
        };
        self.slots.insert(key, Arc::new(slot));
    }
}

async fn lock_writer<'a>(
    slot: &'a EnvSlot,
    key: &EnvKey,
    deadline: Option<Instant>,
) -> Result<MutexGuard<'a, ()>, ConfigError> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, slot.writer.lock())
            .await
            .map_err(|_| ConfigError::Timeout(format!("waiting to write {key}"))),
        None => Ok(slot.writer.lock().await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{ResourceQuantities, ScalingConfig};
    use crate::models::version::DIRECT_AUTHOR;

    fn env(replicas: u32) -> EnvironmentConfig {
        EnvironmentConfig::new(
            replicas,
            ResourceQuantities::new("100m", "128Mi"),
            ResourceQuantities::new("500m", "512Mi"),
        )
    }

    fn key(environment: &str) -> EnvKey {
        EnvKey::new("orders", "team-a", environment)
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = VersionStore::default();
        let err = store.get(&key("staging")).await.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        let err = store.history(&key("staging")).await.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[tokio::test]
    async fn put_assigns_sequential_numbers() {
        let store = VersionStore::default();
        for expected in 1..=3 {
            let v = store.put(&key("staging"), env(expected as u32), DIRECT_AUTHOR).await.unwrap();
            assert_eq!(v.version_number, expected);
        }
        assert_eq!(store.get(&key("staging")).await.unwrap().replicas, 3);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let store = VersionStore::default();
        store.put(&key("dev"), env(1), "a").await.unwrap();
        store.put(&key("dev"), env(2), "b").await.unwrap();
        let history = store.history(&key("dev")).await.unwrap();
        let numbers: Vec<u64> = history.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![2, 1]);
        assert_eq!(history[0].author, "b");
    }

    #[tokio::test]
    async fn invalid_put_leaves_history_unchanged() {
        let store = VersionStore::default();
        store.put(&key("dev"), env(3), DIRECT_AUTHOR).await.unwrap();

        let mut bad = env(3);
        bad.scaling = Some(ScalingConfig {
            enabled: true,
            min_replicas: 5,
            max_replicas: 2,
            ..ScalingConfig::default()
        });
        let err = store.put(&key("dev"), bad, DIRECT_AUTHOR).await.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref r) if !r.valid));
        assert_eq!(store.history(&key("dev")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_first_write_creates_no_record() {
        let store = VersionStore::default();
        let err = store.put(&key("dev"), env(1_000), DIRECT_AUTHOR).await.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(!store.exists(&RecordKey::new("orders", "team-a")));
    }

    #[tokio::test]
    async fn warnings_are_attached_to_version() {
        let store = VersionStore::default();
        let v = store.put(&key("production"), env(1), DIRECT_AUTHOR).await.unwrap();
        assert_eq!(v.warnings.len(), 1);
        assert!(v.warnings[0].contains("production"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_are_gap_free() {
        let store = Arc::new(VersionStore::default());
        store.put(&key("dev"), env(1), DIRECT_AUTHOR).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .put(&key("dev"), env(1 + i % 5), &format!("writer-{i}"))
                        .await
                        .unwrap()
                        .version_number
                })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in futures::future::join_all(handles).await {
            numbers.push(handle.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (2..=51).collect::<Vec<u64>>());
        assert_eq!(store.history(&key("dev")).await.unwrap().len(), 51);
    }

    #[tokio::test]
    async fn version_lookup() {
        let store = VersionStore::default();
        store.put(&key("dev"), env(1), DIRECT_AUTHOR).await.unwrap();
        store.put(&key("dev"), env(2), DIRECT_AUTHOR).await.unwrap();
        assert_eq!(store.version(&key("dev"), 1).await.unwrap().config.replicas, 1);
        for missing in [0, 3] {
            let err = store.version(&key("dev"), missing).await.unwrap_err();
            assert!(matches!(err, ConfigError::VersionNotFound { version, .. } if version == missing));
        }
        let err = store.version(&key("qa"), 1).await.unwrap_err();
        assert!(matches!(err, ConfigError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn record_view_and_list() {
        let store = VersionStore::default();
        store.put(&key("dev"), env(1), DIRECT_AUTHOR).await.unwrap();
        store.put(&key("staging"), env(2), DIRECT_AUTHOR).await.unwrap();
        store
            .put(&EnvKey::new("billing", "team-b", "dev"), env(1), DIRECT_AUTHOR)
            .await
            .unwrap();

        let record = store.get_record(&RecordKey::new("orders", "team-a")).await.unwrap();
        assert_eq!(record.environments.len(), 2);
        assert_eq!(record.environments["staging"].replicas, 2);

        let all = store.list(None).await;
        let names: Vec<_> = all.iter().map(|r| r.application.as_str()).collect();
        assert_eq!(names, vec!["orders", "billing"]);
        assert_eq!(store.list(Some("team-b")).await.len(), 1);
        assert!(store.list(Some("team-z")).await.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = VersionStore::default();
        let record = RecordKey::new("orders", "team-a");
        store.put(&key("dev"), env(1), DIRECT_AUTHOR).await.unwrap();
        assert!(store.delete(&record).await);
        assert!(!store.delete(&record).await);
        assert!(matches!(store.get(&key("dev")).await, Err(ConfigError::NotFound(_))));

        // A new write after delete starts a fresh lineage.
        let v = store.put(&key("dev"), env(1), DIRECT_AUTHOR).await.unwrap();
        assert_eq!(v.version_number, 1);
    }

    #[tokio::test]
    async fn write_times_out_while_record_is_being_deleted() {
        let store = VersionStore::default();
        let record = RecordKey::new("orders", "team-a");
        let gate = store.gate(&record);
        let _held = gate.write().await;

        let ctx = WriteContext::default().with_timeout(Duration::from_millis(20));
        let err = store.put_with(&key("dev"), env(1), DIRECT_AUTHOR, &ctx).await.unwrap_err();
        assert!(matches!(err, ConfigError::Timeout(_)));
        assert!(!store.exists(&record));
    }

    #[tokio::test]
    async fn tightened_policy_applies_to_later_writes() {
        let store = VersionStore::default();
        store.put(&key("dev"), env(8), DIRECT_AUTHOR).await.unwrap();
        store
            .set_policy(ValidationPolicy {
                max_replicas: 4,
                ..ValidationPolicy::default()
            })
            .await;
        let err = store.put(&key("dev"), env(8), DIRECT_AUTHOR).await.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    fn record_env(replicas: &[(&str, u32)]) -> BTreeMap<String, EnvironmentConfig> {
        replicas
            .iter()
            .map(|(name, n)| (name.to_string(), env(*n)))
            .collect()
    }

    #[tokio::test]
    async fn create_fails_for_existing_record() {
        let store = VersionStore::default();
        let record = RecordKey::new("orders", "team-a");
        let ctx = WriteContext::default();
        let versions = store
            .create(&record, RecordMeta::default(), record_env(&[("dev", 1)]), DIRECT_AUTHOR, &ctx)
            .await
            .unwrap();
        assert_eq!(versions[0].version_number, 1);
        let err = store
            .create(&record, RecordMeta::default(), BTreeMap::new(), DIRECT_AUTHOR, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));

        let other = RecordKey::new("billing", "team-a");
        store.put(&other.env("dev"), env(1), DIRECT_AUTHOR).await.unwrap();
        assert!(
            store
                .create(&other, RecordMeta::default(), BTreeMap::new(), DIRECT_AUTHOR, &ctx)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn update_requires_record_and_skips_unchanged() {
        let store = VersionStore::default();
        let record = RecordKey::new("orders", "team-a");
        let ctx = WriteContext::default();
        let err = store
            .update(&record, RecordMeta::default(), BTreeMap::new(), DIRECT_AUTHOR, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));

        store.put(&key("dev"), env(1), DIRECT_AUTHOR).await.unwrap();
        let labels = BTreeMap::from([("app".to_string(), "orders".to_string())]);
        let meta = RecordMeta {
            global: Some(GlobalConfig::default()),
            labels: labels.clone(),
        };
        let versions = store
            .update(&record, meta, record_env(&[("dev", 1), ("staging", 2)]), DIRECT_AUTHOR, &ctx)
            .await
            .unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].environment, "staging");

        let view = store.get_record(&record).await.unwrap();
        assert_eq!(view.labels, labels);
        assert!(view.global.is_some());
        assert_eq!(store.history(&key("dev")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_record_names_are_rejected() {
        let store = VersionStore::default();
        let bad = EnvKey::new("", "Team_A!", "dev");
        let err = store.put(&bad, env(1), DIRECT_AUTHOR).await.unwrap_err();
        let ConfigError::ValidationError(result) = err else {
            panic!("expected a validation error");
        };
        assert!(result.errors.iter().any(|e| e.starts_with("application:")));
        assert!(result.errors.iter().any(|e| e.starts_with("namespace:")));
        assert!(store.list(None).await.is_empty());
        assert!(store.slots.is_empty());
        assert!(store.gates.is_empty());
    }

    #[tokio::test]
    async fn failed_writes_and_deletes_release_bookkeeping() {
        let store = VersionStore::default();
        let record = RecordKey::new("orders", "team-a");
        store.put(&key("dev"), env(1_000), DIRECT_AUTHOR).await.unwrap_err();
        assert!(store.slots.is_empty());
        assert!(store.gates.is_empty());

        store.put(&key("dev"), env(1), DIRECT_AUTHOR).await.unwrap();
        store.put(&key("qa"), env(1_000), DIRECT_AUTHOR).await.unwrap_err();
        assert_eq!(store.slots.len(), 1);

        assert!(store.delete(&record).await);
        assert!(store.slots.is_empty());
        assert!(store.gates.is_empty());
    }

    #[tokio::test]
    async fn timed_out_multi_environment_write_changes_nothing() {
        let store = VersionStore::default();
        let record = RecordKey::new("orders", "team-a");
        let staging = store.slot(&key("staging"));
        let held = staging.writer.lock().await;

        let ctx = WriteContext::default().with_timeout(Duration::from_millis(30));
        let err = store
            .create(
                &record,
                RecordMeta::default(),
                record_env(&[("development", 1), ("staging", 2)]),
                DIRECT_AUTHOR,
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Timeout(_)));
        assert!(!store.exists(&record));
        assert!(!store.slots.contains_key(&key("development")));

        drop(held);
        let versions = store
            .create(
                &record,
                RecordMeta::default(),
                record_env(&[("development", 1), ("staging", 2)]),
                DIRECT_AUTHOR,
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(versions.len(), 2);
    }
}
