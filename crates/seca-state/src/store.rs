//! ResourceStore — keyed container of resource records.
//!
//! The trait is object-safe so the lifecycle layer holds an
//! `Arc<dyn ResourceStore<S>>` and a sharded or transactional backend can be
//! dropped in without touching orchestration logic. Every operation hands
//! out clones; the store alone owns the records.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::types::{ResourceKey, ResourceRecord};

/// Concurrency-safe keyed container of records of kind `S`.
pub trait ResourceStore<S>: Send + Sync {
    /// Get a record by key.
    fn get(&self, key: &ResourceKey) -> StateResult<ResourceRecord<S>>;

    /// List records of a tenant, optionally narrowed to one workspace.
    /// Order is unspecified.
    fn list(&self, tenant: &str, workspace: Option<&str>) -> StateResult<Vec<ResourceRecord<S>>>;

    /// Insert or replace a record.
    fn put(&self, key: ResourceKey, record: ResourceRecord<S>) -> StateResult<()>;

    /// Remove a record, returning it.
    fn delete(&self, key: &ResourceKey) -> StateResult<ResourceRecord<S>>;

    /// Exclusive read-modify-write of a single slot.
    ///
    /// `apply` sees the current record (or `None`) and may edit, replace, or
    /// clear it; whatever is left in the slot is stored. No other reader or
    /// writer runs while `apply` executes.
    fn update(
        &self,
        key: &ResourceKey,
        apply: &mut dyn FnMut(&mut Option<ResourceRecord<S>>),
    ) -> StateResult<()>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store behind a single reader/writer lock.
pub struct MemoryStore<S> {
    records: RwLock<HashMap<ResourceKey, ResourceRecord<S>>>,
}

impl<S> MemoryStore<S> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<S> Default for MemoryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Send + Sync> ResourceStore<S> for MemoryStore<S> {
    fn get(&self, key: &ResourceKey) -> StateResult<ResourceRecord<S>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .get(key)
            .cloned()
            .ok_or_else(|| StateError::NotFound(key.to_string()))
    }

    fn list(&self, tenant: &str, workspace: Option<&str>) -> StateResult<Vec<ResourceRecord<S>>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .values()
            .filter(|r| r.metadata.tenant == tenant)
            .filter(|r| workspace.is_none_or(|ws| r.metadata.workspace.as_deref() == Some(ws)))
            .cloned()
            .collect())
    }

    fn put(&self, key: ResourceKey, record: ResourceRecord<S>) -> StateResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        debug!(%key, version = record.metadata.resource_version, "record stored");
        records.insert(key, record);
        Ok(())
    }

    fn delete(&self, key: &ResourceKey) -> StateResult<ResourceRecord<S>> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let removed = records
            .remove(key)
            .ok_or_else(|| StateError::NotFound(key.to_string()))?;
        debug!(%key, "record deleted");
        Ok(removed)
    }

    fn update(
        &self,
        key: &ResourceKey,
        apply: &mut dyn FnMut(&mut Option<ResourceRecord<S>>),
    ) -> StateResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        // A panicking `apply` must leave the stored record intact.
        let mut slot = records.get(key).cloned();
        apply(&mut slot);
        match slot {
            Some(record) => {
                records.insert(key.clone(), record);
            }
            None => {
                records.remove(key);
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
