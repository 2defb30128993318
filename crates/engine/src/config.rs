// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Read from TOML. Every field has a default, so an empty document is a
//! valid configuration.

use crate::error::ConfigError;
use marlin_adapters::{TracedNetworkService, UreqNetworkService};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Version reported in the hub's shared state and `~sdkver` tokens
pub const DEFAULT_SDK_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub sdk_version: String,
    pub storage: StorageConfig,
    pub hit_queue: HitQueueConfig,
    pub network: NetworkConfig,
    pub rules: RulesConfig,
    pub logging: LoggingConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            sdk_version: DEFAULT_SDK_VERSION.to_string(),
            storage: StorageConfig::default(),
            hit_queue: HitQueueConfig::default(),
            network: NetworkConfig::default(),
            rules: RulesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HubConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root for hit databases and download caches
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir().join("marlin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HitQueueConfig {
    /// Wait before retrying a hit after a recoverable failure
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for HitQueueConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl NetworkConfig {
    /// HTTP client with these timeouts, logging each request
    pub fn service(&self) -> TracedNetworkService<UreqNetworkService> {
        TracedNetworkService::new(UreqNetworkService::new(
            self.connect_timeout,
            self.read_timeout,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Folder under `data_dir` holding downloaded rules bundles
    pub cache_folder: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            cache_folder: "rules".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is unset
    pub filter: String,
    /// Log file; stderr when unset
    pub log_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            log_path: None,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
