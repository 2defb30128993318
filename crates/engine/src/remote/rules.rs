// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rules bundle download and unpacking

use super::cache::RemoteFileCache;
use crate::error::DownloadError;
use marlin_adapters::NetworkService;
use marlin_rules::{handler_for, RULES_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Directory inside a cache entry holding the unpacked bundle
pub const CONTENTS_DIR: &str = "contents";

/// Called with the unpacked directory and the bundle url
pub type BundleReady = Arc<dyn Fn(&Path, &str) + Send + Sync>;

/// Downloads rules bundles (zip or plain JSON) and unpacks them
#[derive(Clone)]
pub struct RulesDownloader<N> {
    cache: RemoteFileCache<N>,
    on_ready: Option<BundleReady>,
}

impl<N: NetworkService> RulesDownloader<N> {
    pub fn new(network: N, cache_dir: &Path, folder: &str) -> Self {
        Self {
            cache: RemoteFileCache::new(network, cache_dir, folder),
            on_ready: None,
        }
    }

    pub fn with_bundle_ready(mut self, on_ready: impl Fn(&Path, &str) + Send + Sync + 'static) -> Self {
        self.on_ready = Some(Arc::new(on_ready));
        self
    }

    /// Unpacked directory of a previous download, if any
    pub fn cached_rules(&self, url: &str) -> Option<PathBuf> {
        let dir = self.cache.entry_dir(url).join(CONTENTS_DIR);
        dir.join(RULES_FILE).is_file().then_some(dir)
    }

    /// Download, unpack and announce `url`; returns the unpacked directory
    ///
    /// A fresh bundle is unpacked before it replaces the cached one, so a
    /// corrupt download leaves the previous rules in place.
    pub async fn download(&self, url: &str) -> Result<PathBuf, DownloadError> {
        let file = self
            .cache
            .fetch_validated(url, |staged| async move {
                self.process_bundle(&staged, url).await.map(drop)
            })
            .await?;
        let dir = match self.cached_rules(url) {
            Some(dir) => dir,
            None => self.process_bundle(&file.path, url).await?,
        };
        tracing::info!(url, dir = %dir.display(), source = ?file.source, "rules bundle ready");
        if let Some(on_ready) = &self.on_ready {
            on_ready(&dir, url);
        }
        Ok(dir)
    }

    /// `download` on a background task
    pub fn start_download(&self, url: &str) -> JoinHandle<Result<PathBuf, DownloadError>> {
        let this = self.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            let result = this.download(&url).await;
            if let Err(e) = &result {
                tracing::warn!(url = %url, error = %e, "rules download failed");
            }
            result
        })
    }

    /// Unpack `bundle` into the cache entry for `url`
    ///
    /// Unpacks into a staging directory first; earlier contents are replaced
    /// only once the handler succeeds.
    pub async fn process_bundle(&self, bundle: &Path, url: &str) -> Result<PathBuf, DownloadError> {
        let bundle = bundle.to_path_buf();
        let entry = self.cache.entry_dir(url);
        tokio::task::spawn_blocking(move || -> Result<PathBuf, DownloadError> {
            let dest = entry.join(CONTENTS_DIR);
            let staging = entry.join(format!("{CONTENTS_DIR}.staging"));
            if staging.exists() {
                fs::remove_dir_all(&staging)?;
            }
            fs::create_dir_all(&staging)?;
            if let Err(e) = handler_for(&bundle).and_then(|h| h.process(&bundle, &staging)) {
                let _ = fs::remove_dir_all(&staging);
                return Err(e.into());
            }
            if dest.exists() {
                fs::remove_dir_all(&dest)?;
            }
            fs::rename(&staging, &dest)?;
            Ok(dest)
        })
        .await
        .map_err(|e| DownloadError::Task(e.to_string()))?
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
