//! The resource kinds served by the mock: block storages and workspaces.
//!
//! Specs are opaque apart from the fields the lifecycle mirrors into status;
//! everything else a client sends is kept verbatim and echoed back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use seca_state::{ResourceSpec, ResourceStatus};

/// Desired state of a block storage volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStorageSpec {
    #[serde(rename = "sizeGB")]
    pub size_gb: u64,
    /// Remaining fields (`skuRef`, `sourceImageRef`, ...), untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlockStorageSpec {
    pub fn with_size(size_gb: u64) -> Self {
        Self {
            size_gb,
            extra: Map::new(),
        }
    }
}

impl ResourceSpec for BlockStorageSpec {
    const DISPLAY_NAME: &'static str = "BlockStorage";
    const KIND: &'static str = "block-storage";
    const PLURAL: &'static str = "block-storages";
    const PROVIDER: &'static str = "seca.storage";

    fn validate(&self) -> Result<(), String> {
        if self.size_gb == 0 {
            return Err("sizeGB must be at least 1".to_string());
        }
        Ok(())
    }

    fn mirror_status(&self, status: &mut ResourceStatus) {
        status.size_gb = Some(self.size_gb);
    }
}

/// Desired state of a workspace. Carries no fields the mock interprets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSpec {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceSpec for WorkspaceSpec {
    const DISPLAY_NAME: &'static str = "Workspace";
    const KIND: &'static str = "workspace";
    const PLURAL: &'static str = "workspaces";
    const PROVIDER: &'static str = "seca.workspace";
}
