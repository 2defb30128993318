// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote configuration download

use super::cache::RemoteFileCache;
use crate::error::DownloadError;
use marlin_adapters::NetworkService;
use std::path::Path;

pub const CONFIG_CACHE_FOLDER: &str = "config";

/// Downloads one configuration document, keeping the last good copy
#[derive(Clone)]
pub struct ConfigurationDownloader<N> {
    url: String,
    cache: RemoteFileCache<N>,
}

impl<N: NetworkService> ConfigurationDownloader<N> {
    pub fn new(network: N, cache_dir: &Path, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cache: RemoteFileCache::new(network, cache_dir, CONFIG_CACHE_FOLDER),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fresh configuration, or the cached copy when the server is unreachable
    ///
    /// A response that is not JSON is an error and leaves the cache as it was.
    pub async fn download_config(&self) -> Result<String, DownloadError> {
        let file = self
            .cache
            .fetch_validated(&self.url, |staged| async move {
                let content = tokio::fs::read_to_string(staged).await?;
                serde_json::from_str::<serde_json::Value>(&content)?;
                Ok::<(), DownloadError>(())
            })
            .await?;
        let content = tokio::fs::read_to_string(&file.path).await?;
        serde_json::from_str::<serde_json::Value>(&content)?;
        tracing::debug!(url = %self.url, source = ?file.source, "configuration loaded");
        Ok(content)
    }

    /// The cached copy only, if it is valid JSON
    pub fn load_cached_config(&self) -> Option<String> {
        let file = self.cache.cached(&self.url)?;
        let content = std::fs::read_to_string(file.path).ok()?;
        serde_json::from_str::<serde_json::Value>(&content).ok()?;
        Some(content)
    }
}
