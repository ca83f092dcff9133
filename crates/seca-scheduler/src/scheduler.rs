//! TransitionScheduler — applies a target state to a record after a delay.
//!
//! Each scheduled transition is a tokio task that sleeps, then re-enters the
//! store through `ResourceStore::update` and applies the target state only if
//! the record is still present at the version it was scheduled against.
//! Cancellation aborts tasks early; the fire-time check still guards every
//! write, so an abort that loses a race with a firing task changes nothing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use seca_core::{Clock, ResourceState};
use seca_state::{ResourceKey, ResourceSpec, ResourceStore};

use crate::error::{SchedulerError, SchedulerResult};

/// A registered, not yet fired transition.
struct PendingTransition {
    id: u64,
    version: u64,
    target: ResourceState,
    handle: JoinHandle<()>,
}

type PendingMap = HashMap<ResourceKey, Vec<PendingTransition>>;

/// Schedules delayed, version-guarded state transitions for records of kind `S`.
pub struct TransitionScheduler<S> {
    store: Arc<dyn ResourceStore<S>>,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    pending: Arc<Mutex<PendingMap>>,
    next_id: AtomicU64,
}

impl<S: ResourceSpec> TransitionScheduler<S> {
    /// Create a scheduler that spawns onto the current tokio runtime.
    pub fn new(store: Arc<dyn ResourceStore<S>>, clock: Arc<dyn Clock>) -> SchedulerResult<Self> {
        let runtime = Handle::try_current().map_err(|e| SchedulerError::NoRuntime(e.to_string()))?;
        Ok(Self::with_runtime(store, clock, runtime))
    }

    /// Create a scheduler that spawns onto the given runtime.
    pub fn with_runtime(
        store: Arc<dyn ResourceStore<S>>,
        clock: Arc<dyn Clock>,
        runtime: Handle,
    ) -> Self {
        Self {
            store,
            clock,
            runtime,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Apply `target` to the record at `key` after `delay`, provided the
    /// record still exists with `resource_version == version` at that time.
    ///
    /// Safe to call while holding the store lock (from inside an `update`
    /// closure): it only spawns and registers.
    pub fn schedule(
        &self,
        key: &ResourceKey,
        version: u64,
        delay: Duration,
        target: ResourceState,
    ) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let store = self.store.clone();
        let clock = self.clock.clone();
        let registry = self.pending.clone();
        let task_key = key.clone();

        // Register under the lock before the task can deregister itself.
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(store.as_ref(), clock.as_ref(), &task_key, version, target);
            deregister(&registry, &task_key, id);
        });
        pending.entry(key.clone()).or_default().push(PendingTransition {
            id,
            version,
            target,
            handle,
        });
        debug!(%key, version, %target, ?delay, "transition scheduled");
    }

    /// Abort every pending transition for `key`. Returns how many were aborted.
    pub fn cancel(&self, key: &ResourceKey) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(transitions) = pending.remove(key) else {
            return 0;
        };
        let count = transitions.len();
        for transition in transitions {
            transition.handle.abort();
        }
        if count > 0 {
            debug!(%key, count, "pending transitions cancelled");
        }
        count
    }

    /// Abort pending transitions for `key` scheduled against a version older
    /// than `current`. Returns how many were aborted.
    pub fn cancel_superseded(&self, key: &ResourceKey, current: u64) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(transitions) = pending.get_mut(key) else {
            return 0;
        };

        let mut cancelled = 0;
        transitions.retain(|t| {
            if t.version < current {
                t.handle.abort();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        if transitions.is_empty() {
            pending.remove(key);
        }
        if cancelled > 0 {
            debug!(%key, current, cancelled, "superseded transitions cancelled");
        }
        cancelled
    }

    /// Number of transitions that have been scheduled and have not yet fired
    /// or been cancelled.
    pub fn pending(&self) -> usize {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.values().map(Vec::len).sum()
    }

    /// Target states still pending for `key`, as `(version, target)` pairs.
    pub fn pending_for(&self, key: &ResourceKey) -> Vec<(u64, ResourceState)> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending
            .get(key)
            .map(|ts| ts.iter().map(|t| (t.version, t.target)).collect())
            .unwrap_or_default()
    }
}

/// Fire-time check-and-apply, atomic under the store's exclusive lock.
fn fire<S: ResourceSpec>(
    store: &dyn ResourceStore<S>,
    clock: &dyn Clock,
    key: &ResourceKey,
    version: u64,
    target: ResourceState,
) {
    let result = store.update(key, &mut |slot| match slot {
        None => debug!(%key, version, %target, "transition discarded, record gone"),
        Some(record) if record.version() != version => debug!(
            %key,
            version,
            current = record.version(),
            %target,
            "transition discarded, version superseded"
        ),
        Some(record) => {
            if record.set_state(target, clock.now()) {
                debug!(%key, version, %target, "transition applied");
            }
        }
    });
    if let Err(e) = result {
        warn!(%key, version, %target, error = %e, "transition could not be applied");
    }
}

fn deregister(registry: &Mutex<PendingMap>, key: &ResourceKey, id: u64) {
    let mut pending = registry.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(transitions) = pending.get_mut(key) {
        transitions.retain(|t| t.id != id);
        if transitions.is_empty() {
            pending.remove(key);
        }
    }
}
