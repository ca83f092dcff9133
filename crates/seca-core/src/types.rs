//! Shared types used across the SECA mock crates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// User-supplied key/value labels attached to resources and SKUs.
pub type Labels = BTreeMap<String, String>;

/// Provisioning state of a managed resource.
///
/// Every resource kind walks the same machine:
/// `Pending -> Creating -> Active` on create and `Updating -> Active` on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Pending,
    Creating,
    Active,
    Updating,
}

impl ResourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Pending => "pending",
            ResourceState::Creating => "creating",
            ResourceState::Active => "active",
            ResourceState::Updating => "updating",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
