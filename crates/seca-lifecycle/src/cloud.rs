//! MockCloud — every provider of the mock behind one handle.

use tracing::info;

use seca_core::SecadConfig;

use crate::catalog::SkuCatalog;
use crate::error::LifecycleResult;
use crate::kinds::{BlockStorageSpec, WorkspaceSpec};
use crate::lifecycle::Lifecycle;

pub struct MockCloud {
    pub workspaces: Lifecycle<WorkspaceSpec>,
    pub block_storages: Lifecycle<BlockStorageSpec>,
    pub skus: SkuCatalog,
}

impl MockCloud {
    /// Build in-memory providers from config. Must run inside a tokio runtime.
    pub fn new(config: &SecadConfig) -> LifecycleResult<Self> {
        let cloud = Self {
            workspaces: Lifecycle::in_memory(config.lifecycle.clone())?,
            block_storages: Lifecycle::in_memory(config.lifecycle.clone())?,
            skus: SkuCatalog::storage(config.catalog.region.clone()),
        };
        info!(
            region = %config.lifecycle.region,
            catalog_region = %config.catalog.region,
            "mock cloud initialised"
        );
        Ok(cloud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seca_state::ResourceKey;

    use crate::lifecycle::ResourceRequest;

    #[tokio::test(start_paused = true)]
    async fn providers_are_independent() {
        let cloud = MockCloud::new(&SecadConfig::default()).unwrap();
        let ws = ResourceKey::tenant_scoped("t1", "ws-1");
        cloud
            .workspaces
            .create_or_update(&ws, ResourceRequest::new(WorkspaceSpec::default()))
            .unwrap();

        assert!(cloud.block_storages.list("t1", None, None).unwrap().is_empty());
        assert_eq!(cloud.workspaces.list("t1", None, None).unwrap().len(), 1);
        assert_eq!(cloud.skus.region(), "eu-central-1");
    }

    #[test]
    fn requires_a_runtime() {
        assert!(MockCloud::new(&SecadConfig::default()).is_err());
    }
}
