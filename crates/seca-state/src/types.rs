//! Resource records held by the store.
//!
//! A record is the triple the SECA API returns for every managed resource:
//! user `spec` (plus `labels`), server-owned `metadata`, and `status` with the
//! provisioning state and its condition log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seca_core::{Labels, ResourceState};

/// Reason tag attached to every state-change condition.
pub const STATE_CHANGE_REASON: &str = "stateChange";

/// Static description of a resource kind, implemented by its spec type.
pub trait ResourceSpec: Clone + Send + Sync + 'static {
    /// Name used in condition messages, e.g. `BlockStorage`.
    const DISPLAY_NAME: &'static str;
    /// Value of `metadata.kind`, e.g. `block-storage`.
    const KIND: &'static str;
    /// Plural path segment, e.g. `block-storages`.
    const PLURAL: &'static str;
    /// Value of `metadata.provider`, e.g. `seca.storage`.
    const PROVIDER: &'static str;

    /// Reject a spec the provider would refuse, with a reason.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Copy spec-derived fields into status. Called on every effective
    /// state change.
    fn mirror_status(&self, _status: &mut ResourceStatus) {}
}

// ── Key ───────────────────────────────────────────────────────────

/// Composite identity of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    tenant: String,
    workspace: Option<String>,
    name: String,
}

impl ResourceKey {
    pub fn new(
        tenant: impl Into<String>,
        workspace: Option<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            workspace,
            name: name.into(),
        }
    }

    /// Key for a resource that lives directly under a tenant.
    pub fn tenant_scoped(tenant: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(tenant, None, name)
    }

    /// Key for a resource that lives inside a workspace.
    pub fn workspace_scoped(
        tenant: impl Into<String>,
        workspace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(tenant, Some(workspace.into()), name)
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// API resource path, e.g. `tenants/t/workspaces/w/block-storages/n`.
    pub fn resource_path(&self, plural: &str) -> String {
        match &self.workspace {
            Some(ws) => format!(
                "tenants/{}/workspaces/{}/{}/{}",
                self.tenant, ws, plural, self.name
            ),
            None => format!("tenants/{}/{}/{}", self.tenant, plural, self.name),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.workspace {
            Some(ws) => write!(f, "{}/{}/{}", self.tenant, ws, self.name),
            None => write!(f, "{}/{}", self.tenant, self.name),
        }
    }
}

// ── Record ────────────────────────────────────────────────────────

/// A stored resource of kind `S`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord<S> {
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    pub spec: S,
    pub metadata: ResourceMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResourceStatus>,
}

/// Server-owned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub tenant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    pub name: String,
    /// Full resource path (`tenants/.../{plural}/{name}`).
    pub resource: String,
    pub kind: String,
    pub api_version: String,
    pub provider: String,
    pub region: String,
    /// Optimistic-concurrency counter, starts at 1.
    pub resource_version: u64,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    /// Last verb applied to the record.
    pub verb: String,
}

/// Provisioning status with its append-only condition log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ResourceState>,
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
    /// Allocated size mirrored from a block storage spec.
    #[serde(rename = "sizeGB", default, skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<u64>,
}

/// One entry of the condition log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    pub last_transition_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub state: ResourceState,
}

impl<S> ResourceRecord<S> {
    pub fn version(&self) -> u64 {
        self.metadata.resource_version
    }

    pub fn state(&self) -> Option<ResourceState> {
        self.status.as_ref().and_then(|s| s.state)
    }

    pub fn conditions(&self) -> &[StatusCondition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl<S: ResourceSpec> ResourceRecord<S> {
    /// Move the record to `state`, appending one condition.
    ///
    /// Returns `false` (and changes nothing) when the record is already in
    /// `state`. The version is never touched here.
    pub fn set_state(&mut self, state: ResourceState, at: DateTime<Utc>) -> bool {
        let status = self.status.get_or_insert_with(ResourceStatus::default);
        if status.state == Some(state) {
            return false;
        }

        self.spec.mirror_status(status);
        status.state = Some(state);
        status.conditions.push(StatusCondition {
            last_transition_at: at,
            message: Some(format!("{} is now in {} state", S::DISPLAY_NAME, state)),
            reason: Some(STATE_CHANGE_REASON.to_string()),
            state,
        });
        true
    }
}

/// Next resource version. Wrapping to zero restarts at 1.
pub fn next_version(current: u64) -> u64 {
    match current.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct DiskSpec {
        size: u64,
    }

    impl ResourceSpec for DiskSpec {
        const DISPLAY_NAME: &'static str = "Disk";
        const KIND: &'static str = "disk";
        const PLURAL: &'static str = "disks";
        const PROVIDER: &'static str = "test.disks";

        fn mirror_status(&self, status: &mut ResourceStatus) {
            status.size_gb = Some(self.size);
        }
    }

    fn test_record(size: u64) -> ResourceRecord<DiskSpec> {
        let now = Utc::now();
        ResourceRecord {
            labels: Labels::new(),
            spec: DiskSpec { size },
            metadata: ResourceMetadata {
                tenant: "t1".to_string(),
                workspace: Some("ws".to_string()),
                name: "d1".to_string(),
                resource: "tenants/t1/workspaces/ws/disks/d1".to_string(),
                kind: "disk".to_string(),
                api_version: "v1".to_string(),
                provider: "test.disks".to_string(),
                region: "global".to_string(),
                resource_version: 1,
                created_at: now,
                last_modified_at: now,
                verb: "put".to_string(),
            },
            status: None,
        }
    }

    #[test]
    fn key_paths_and_display() {
        let ws = ResourceKey::workspace_scoped("t1", "ws", "vol");
        assert_eq!(ws.resource_path("block-storages"), "tenants/t1/workspaces/ws/block-storages/vol");
        assert_eq!(ws.to_string(), "t1/ws/vol");

        let tenant = ResourceKey::tenant_scoped("t1", "ws");
        assert_eq!(tenant.resource_path("workspaces"), "tenants/t1/workspaces/ws");
        assert_eq!(tenant.workspace(), None);
    }

    #[test]
    fn keys_distinguish_scope() {
        assert_ne!(
            ResourceKey::tenant_scoped("t", "n"),
            ResourceKey::workspace_scoped("t", "", "n")
        );
    }

    #[test]
    fn first_state_initialises_status_and_mirrors() {
        let mut record = test_record(100);
        assert!(record.status.is_none());
        assert!(record.set_state(ResourceState::Pending, Utc::now()));

        let status = record.status.as_ref().unwrap();
        assert_eq!(status.state, Some(ResourceState::Pending));
        assert_eq!(status.size_gb, Some(100));
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(
            status.conditions[0].message.as_deref(),
            Some("Disk is now in pending state")
        );
        assert_eq!(status.conditions[0].reason.as_deref(), Some(STATE_CHANGE_REASON));
    }

    #[test]
    fn same_state_is_a_noop() {
        let mut record = test_record(10);
        record.set_state(ResourceState::Active, Utc::now());
        let before = record.clone();

        assert!(!record.set_state(ResourceState::Active, Utc::now()));
        assert_eq!(record, before);
        assert_eq!(record.version(), 1);
    }

    #[test]
    fn conditions_append_in_order() {
        let mut record = test_record(10);
        for state in [
            ResourceState::Pending,
            ResourceState::Creating,
            ResourceState::Active,
        ] {
            record.set_state(state, Utc::now());
        }
        let states: Vec<_> = record.conditions().iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            vec![ResourceState::Pending, ResourceState::Creating, ResourceState::Active]
        );
    }

    #[test]
    fn mirror_tracks_latest_spec() {
        let mut record = test_record(10);
        record.set_state(ResourceState::Pending, Utc::now());
        record.spec.size = 20;
        record.set_state(ResourceState::Updating, Utc::now());
        assert_eq!(record.status.unwrap().size_gb, Some(20));
    }

    #[test]
    fn version_wraps_to_one() {
        assert_eq!(next_version(1), 2);
        assert_eq!(next_version(u64::MAX), 1);
    }

    #[test]
    fn record_json_uses_api_field_names() {
        let mut record = test_record(5);
        record.set_state(ResourceState::Pending, Utc::now());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["metadata"]["resourceVersion"], 1);
        assert_eq!(json["metadata"]["apiVersion"], "v1");
        assert_eq!(json["status"]["state"], "pending");
        assert_eq!(json["status"]["sizeGB"], 5);
        assert!(json["status"]["conditions"][0]["lastTransitionAt"].is_string());
        assert!(json.get("labels").is_none());
    }
}
