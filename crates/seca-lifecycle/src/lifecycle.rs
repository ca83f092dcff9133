//! Lifecycle — create/update/delete/get/list for one resource kind.
//!
//! All writes for a key run inside a single `ResourceStore::update` call, and
//! the follow-up transitions are scheduled (or cancelled) from within that
//! same critical section. Concurrent requests on one key are therefore
//! linearised together with their scheduling side effects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use seca_core::config::LifecycleConfig;
use seca_core::{Clock, Labels, ResourceState, SystemClock};
use seca_scheduler::TransitionScheduler;
use seca_selector::Selector;
use seca_state::{
    MemoryStore, ResourceKey, ResourceMetadata, ResourceRecord, ResourceSpec, ResourceStore,
    next_version,
};

use crate::error::{LifecycleError, LifecycleResult};

/// API version stamped on every record.
pub const API_VERSION: &str = "v1";

/// Verb recorded for create-or-update.
pub const PUT_VERB: &str = "put";

/// Longest tenant, workspace, or resource name accepted.
pub const MAX_NAME_LEN: usize = 63;

/// Caller-supplied part of a create-or-update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest<S> {
    #[serde(default)]
    pub labels: Labels,
    pub spec: S,
}

impl<S> ResourceRequest<S> {
    pub fn new(spec: S) -> Self {
        Self {
            labels: Labels::new(),
            spec,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Result of create-or-update.
#[derive(Debug, Clone)]
pub struct Applied<S> {
    pub record: ResourceRecord<S>,
    /// `true` if the key was absent and a new record was created.
    pub created: bool,
}

/// Lifecycle orchestrator for records of kind `S`.
pub struct Lifecycle<S> {
    store: Arc<dyn ResourceStore<S>>,
    scheduler: TransitionScheduler<S>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

impl<S: ResourceSpec> Lifecycle<S> {
    /// Build a lifecycle over the given store. Must be called from within a
    /// tokio runtime; transitions are spawned onto it.
    pub fn new(
        store: Arc<dyn ResourceStore<S>>,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> LifecycleResult<Self> {
        config
            .validate()
            .map_err(|e| LifecycleError::InvalidInput(e.to_string()))?;
        let scheduler = TransitionScheduler::new(store.clone(), clock.clone())?;
        Ok(Self {
            store,
            scheduler,
            clock,
            config,
        })
    }

    /// Lifecycle backed by a fresh [`MemoryStore`] and the system clock.
    pub fn in_memory(config: LifecycleConfig) -> LifecycleResult<Self> {
        Self::new(Arc::new(MemoryStore::<S>::new()), Arc::new(SystemClock), config)
    }

    pub fn scheduler(&self) -> &TransitionScheduler<S> {
        &self.scheduler
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Create the record at `key` or replace it with a new version.
    ///
    /// Create: version 1 in `pending`, then `creating` and `active` are
    /// scheduled. Update: the existing record is first stamped `active`, then
    /// superseded by version + 1 in `updating`, with `active` scheduled for
    /// the new version. The condition log carries over across versions.
    pub fn create_or_update(
        &self,
        key: &ResourceKey,
        request: ResourceRequest<S>,
    ) -> LifecycleResult<Applied<S>> {
        validate_key(key)?;
        request.spec.validate().map_err(LifecycleError::InvalidInput)?;

        let now = self.clock.now();
        let mut request = Some(request);
        let mut applied = None;

        self.store.update(key, &mut |slot| {
            let Some(request) = request.take() else {
                return;
            };
            let outcome = match slot.take() {
                None => self.create(key, request, now),
                Some(existing) => self.supersede(key, existing, request, now),
            };
            *slot = Some(outcome.record.clone());
            applied = Some(outcome);
        })?;

        let applied = applied.ok_or_else(|| LifecycleError::UpdateSkipped(key.to_string()))?;
        info!(
            %key,
            kind = S::KIND,
            version = applied.record.version(),
            created = applied.created,
            "resource applied"
        );
        Ok(applied)
    }

    /// Remove the record at `key` and cancel its pending transitions.
    pub fn delete(&self, key: &ResourceKey) -> LifecycleResult<ResourceRecord<S>> {
        let mut removed = None;
        self.store.update(key, &mut |slot| {
            removed = slot.take();
            if removed.is_some() {
                self.scheduler.cancel(key);
            }
        })?;

        let record = removed.ok_or_else(|| LifecycleError::NotFound(key.to_string()))?;
        info!(%key, kind = S::KIND, version = record.version(), "resource deleted");
        Ok(record)
    }

    pub fn get(&self, key: &ResourceKey) -> LifecycleResult<ResourceRecord<S>> {
        Ok(self.store.get(key)?)
    }

    /// Records of `tenant` (and `workspace`, if given) whose labels match
    /// `selector`, sorted by name.
    pub fn list(
        &self,
        tenant: &str,
        workspace: Option<&str>,
        selector: Option<&Selector>,
    ) -> LifecycleResult<Vec<ResourceRecord<S>>> {
        let mut records: Vec<_> = self
            .store
            .list(tenant, workspace)?
            .into_iter()
            .filter(|r| selector.is_none_or(|s| s.matches(&r.labels)))
            .collect();
        records.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        debug!(
            tenant,
            workspace = ?workspace,
            selector = ?selector.map(ToString::to_string),
            count = records.len(),
            "resources listed"
        );
        Ok(records)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn create(&self, key: &ResourceKey, request: ResourceRequest<S>, now: DateTime<Utc>) -> Applied<S> {
        let mut record = ResourceRecord {
            labels: request.labels,
            spec: request.spec,
            metadata: self.metadata(key, 1, now, now),
            status: None,
        };
        record.set_state(ResourceState::Pending, now);

        self.scheduler.schedule(
            key,
            1,
            self.config.creating_delay,
            ResourceState::Creating,
        );
        self.scheduler.schedule(
            key,
            1,
            self.config.create_active_delay,
            ResourceState::Active,
        );

        Applied {
            record,
            created: true,
        }
    }

    fn supersede(
        &self,
        key: &ResourceKey,
        mut existing: ResourceRecord<S>,
        request: ResourceRequest<S>,
        now: DateTime<Utc>,
    ) -> Applied<S> {
        // The outgoing version is closed out as active before it is replaced.
        existing.set_state(ResourceState::Active, now);

        let version = next_version(existing.version());
        let mut record = ResourceRecord {
            labels: request.labels,
            spec: request.spec,
            metadata: self.metadata(key, version, existing.metadata.created_at, now),
            status: existing.status,
        };
        record.set_state(ResourceState::Updating, now);

        self.scheduler.cancel_superseded(key, version);
        self.scheduler.schedule(
            key,
            version,
            self.config.update_active_delay,
            ResourceState::Active,
        );

        Applied {
            record,
            created: false,
        }
    }

    fn metadata(
        &self,
        key: &ResourceKey,
        version: u64,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ResourceMetadata {
        ResourceMetadata {
            tenant: key.tenant().to_string(),
            workspace: key.workspace().map(str::to_string),
            name: key.name().to_string(),
            resource: key.resource_path(S::PLURAL),
            kind: S::KIND.to_string(),
            api_version: API_VERSION.to_string(),
            provider: S::PROVIDER.to_string(),
            region: self.config.region.clone(),
            resource_version: version,
            created_at,
            last_modified_at: now,
            verb: PUT_VERB.to_string(),
        }
    }
}

/// Reject empty or malformed path segments.
pub fn validate_key(key: &ResourceKey) -> LifecycleResult<()> {
    validate_segment("tenant", key.tenant())?;
    if let Some(ws) = key.workspace() {
        validate_segment("workspace", ws)?;
    }
    validate_segment("name", key.name())
}

fn validate_segment(field: &str, value: &str) -> LifecycleResult<()> {
    if value.is_empty() {
        return Err(LifecycleError::InvalidInput(format!("{field} must not be empty")));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(LifecycleError::InvalidInput(format!(
            "{field} is longer than {MAX_NAME_LEN} characters"
        )));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(LifecycleError::InvalidInput(format!(
            "{field} contains invalid character {c:?}"
        )));
    }
    Ok(())
}
