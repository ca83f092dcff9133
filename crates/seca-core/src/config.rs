//! secad.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecadConfig {
    pub server: ServerConfig,
    pub lifecycle: LifecycleConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Simulated provisioning timings and the region stamped on resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub region: String,
    /// Delay after create before `creating` is applied.
    #[serde(with = "duration_str")]
    pub creating_delay: Duration,
    /// Delay after create before `active` is applied.
    #[serde(with = "duration_str")]
    pub create_active_delay: Duration,
    /// Delay after update before `active` is applied.
    #[serde(with = "duration_str")]
    pub update_active_delay: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            region: "global".to_string(),
            creating_delay: Duration::from_millis(100),
            create_active_delay: Duration::from_millis(600),
            update_active_delay: Duration::from_millis(500),
        }
    }
}

impl LifecycleConfig {
    /// `creating` must land strictly before `active`, or the create
    /// sequence would end in `creating`.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.creating_delay < self.create_active_delay,
            "lifecycle.creating_delay ({}) must be shorter than lifecycle.create_active_delay ({})",
            humantime::format_duration(self.creating_delay),
            humantime::format_duration(self.create_active_delay),
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub region: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            region: "eu-central-1".to_string(),
        }
    }
}

impl SecadConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SecadConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.lifecycle.validate()
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Durations as humantime strings ("100ms", "1s 500ms").
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
