//! Static storage SKU catalog.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use seca_core::Labels;
use seca_selector::Selector;

use crate::error::{LifecycleError, LifecycleResult};

pub const SKU_KIND: &str = "storage-sku";
pub const SKU_PROVIDER: &str = "seca.storage/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    LocalEphemeral,
    LocalDurable,
    RemoteDurable,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::LocalEphemeral => "LocalEphemeral",
            StorageType::LocalDurable => "LocalDurable",
            StorageType::RemoteDurable => "RemoteDurable",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuDefinition {
    pub name: &'static str,
    pub tier: &'static str,
    pub iops: u32,
    pub storage_type: StorageType,
    pub min_volume_size: u32,
}

const fn sku(
    name: &'static str,
    tier: &'static str,
    iops: u32,
    storage_type: StorageType,
) -> SkuDefinition {
    SkuDefinition {
        name,
        tier,
        iops,
        storage_type,
        min_volume_size: 50,
    }
}

pub const STORAGE_SKUS: [SkuDefinition; 15] = [
    sku("seca.rd100", "RD100", 100, StorageType::RemoteDurable),
    sku("seca.rd500", "RD500", 500, StorageType::RemoteDurable),
    sku("seca.rd2k", "RD2K", 2_000, StorageType::RemoteDurable),
    sku("seca.rd10k", "RD10K", 10_000, StorageType::RemoteDurable),
    sku("seca.rd20k", "RD20K", 20_000, StorageType::RemoteDurable),
    sku("seca.ld100", "LD100", 100, StorageType::LocalDurable),
    sku("seca.ld500", "LD500", 500, StorageType::LocalDurable),
    sku("seca.ld5k", "LD5K", 5_000, StorageType::LocalDurable),
    sku("seca.ld20k", "LD20K", 20_000, StorageType::LocalDurable),
    sku("seca.ld40k", "LD40K", 40_000, StorageType::LocalDurable),
    sku("seca.le100", "LE100", 100, StorageType::LocalEphemeral),
    sku("seca.le500", "LE500", 500, StorageType::LocalEphemeral),
    sku("seca.le5k", "LE5K", 5_000, StorageType::LocalEphemeral),
    sku("seca.le20k", "LE20K", 20_000, StorageType::LocalEphemeral),
    sku("seca.le40k", "LE40K", 40_000, StorageType::LocalEphemeral),
];

/// A SKU as rendered for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSku {
    pub labels: Labels,
    pub metadata: SkuMetadata,
    pub spec: SkuSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuMetadata {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub provider: String,
    pub region: String,
    pub resource: String,
    pub tenant: String,
    pub verb: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuSpec {
    pub iops: u32,
    pub min_volume_size: u32,
    #[serde(rename = "type")]
    pub storage_type: StorageType,
}

impl SkuDefinition {
    pub fn labels(&self) -> Labels {
        Labels::from([
            ("provider".to_string(), "seca".to_string()),
            ("tier".to_string(), self.tier.to_string()),
            ("type".to_string(), self.storage_type.to_string()),
            ("iops".to_string(), self.iops.to_string()),
            ("minVolumeSize".to_string(), self.min_volume_size.to_string()),
        ])
    }

    pub fn render(&self, tenant: &str, region: &str) -> StorageSku {
        StorageSku {
            labels: self.labels(),
            metadata: SkuMetadata {
                api_version: "v1".to_string(),
                kind: SKU_KIND.to_string(),
                name: self.name.to_string(),
                provider: SKU_PROVIDER.to_string(),
                region: region.to_string(),
                resource: format!("tenants/{tenant}/skus/{}", self.name),
                tenant: tenant.to_string(),
                verb: "get".to_string(),
            },
            spec: SkuSpec {
                iops: self.iops,
                min_volume_size: self.min_volume_size,
                storage_type: self.storage_type,
            },
        }
    }
}

/// Read-only catalog of storage SKUs, rendered per tenant.
#[derive(Debug, Clone)]
pub struct SkuCatalog {
    region: String,
    definitions: &'static [SkuDefinition],
}

impl SkuCatalog {
    pub fn storage(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            definitions: &STORAGE_SKUS,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// SKUs whose labels match `selector`, in catalog order.
    pub fn list(&self, tenant: &str, selector: Option<&Selector>) -> Vec<StorageSku> {
        let skus: Vec<_> = self
            .definitions
            .iter()
            .filter(|def| selector.is_none_or(|s| s.matches(&def.labels())))
            .map(|def| def.render(tenant, &self.region))
            .collect();
        debug!(tenant, count = skus.len(), "skus listed");
        skus
    }

    pub fn get(&self, tenant: &str, name: &str) -> LifecycleResult<StorageSku> {
        self.definitions
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.render(tenant, &self.region))
            .ok_or_else(|| LifecycleError::NotFound(format!("sku {name}")))
    }
}
