// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional-GET file cache keyed by URL

use crate::error::DownloadError;
use marlin_adapters::{NetworkRequest, NetworkResponse, NetworkService};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};

pub const CONTENT_FILE: &str = "content";
pub const METADATA_FILE: &str = "metadata.json";

/// Validators remembered from the last 200 response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Where a fetched file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Fresh 200 response
    Network,
    /// Server answered 304
    NotModified,
    /// Network or server failure; cached copy used
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    pub path: PathBuf,
    pub metadata: CacheMetadata,
    pub source: FetchSource,
}

/// Directory name for `url`: hex sha256 of the url
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Downloads files into `<cache_dir>/<folder>/<sha256(url)>/`
#[derive(Clone)]
pub struct RemoteFileCache<N> {
    network: N,
    root: PathBuf,
}

impl<N: NetworkService> RemoteFileCache<N> {
    pub fn new(network: N, cache_dir: &Path, folder: &str) -> Self {
        Self {
            network,
            root: cache_dir.join(folder),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_dir(&self, url: &str) -> PathBuf {
        self.root.join(cache_key(url))
    }

    /// The cached copy, without touching the network
    pub fn cached(&self, url: &str) -> Option<CachedFile> {
        let dir = self.entry_dir(url);
        let path = dir.join(CONTENT_FILE);
        if !path.is_file() {
            return None;
        }
        let metadata = std::fs::read(dir.join(METADATA_FILE))
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_else(|| CacheMetadata {
                url: url.to_string(),
                ..CacheMetadata::default()
            });
        Some(CachedFile {
            path,
            metadata,
            source: FetchSource::Fallback,
        })
    }

    /// Fetch `url`, revalidating any cached copy
    ///
    /// Falls back to the cached copy when the request fails or the server
    /// answers with an error status.
    pub async fn fetch(&self, url: &str) -> Result<CachedFile, DownloadError> {
        self.fetch_validated(url, |_| async { Ok(()) }).await
    }

    /// `fetch`, where a fresh body is staged and handed to `validate` first
    ///
    /// The cached copy is replaced only when `validate` accepts the staged
    /// file. A rejected body leaves the cache untouched and returns the error.
    pub async fn fetch_validated<F, Fut>(
        &self,
        url: &str,
        validate: F,
    ) -> Result<CachedFile, DownloadError>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<(), DownloadError>>,
    {
        let cached = self.cached(url);
        let mut request = NetworkRequest::get(url);
        if let Some(file) = &cached {
            if let Some(etag) = &file.metadata.etag {
                request = request.header("If-None-Match", etag.as_str());
            }
            if let Some(last_modified) = &file.metadata.last_modified {
                request = request.header("If-Modified-Since", last_modified.as_str());
            }
        }

        match self.network.connect(request).await {
            Ok(response) if response.status == 200 => self.store(url, &response, validate).await,
            Ok(response) if response.status == 304 => match cached {
                Some(file) => {
                    tracing::debug!(url, "not modified, using cache");
                    Ok(CachedFile {
                        source: FetchSource::NotModified,
                        ..file
                    })
                }
                None => Err(DownloadError::Status(304)),
            },
            Ok(response) => {
                tracing::warn!(url, status = response.status, "download failed");
                cached.ok_or(DownloadError::Status(response.status))
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "download failed");
                cached.ok_or(DownloadError::Network(e))
            }
        }
    }

    async fn store<F, Fut>(
        &self,
        url: &str,
        response: &NetworkResponse,
        validate: F,
    ) -> Result<CachedFile, DownloadError>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<(), DownloadError>>,
    {
        let dir = self.entry_dir(url);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(CONTENT_FILE);
        let partial = dir.join(format!("{CONTENT_FILE}.partial"));
        tokio::fs::write(&partial, &response.body).await?;
        if let Err(e) = validate(partial.clone()).await {
            tracing::warn!(url, error = %e, "rejected downloaded content, keeping cache");
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &path).await?;

        let metadata = CacheMetadata {
            url: url.to_string(),
            etag: response.header("ETag").map(str::to_string),
            last_modified: response.header("Last-Modified").map(str::to_string),
        };
        tokio::fs::write(dir.join(METADATA_FILE), serde_json::to_vec_pretty(&metadata)?).await?;
        tracing::info!(url, bytes = response.body.len(), "download cached");

        Ok(CachedFile {
            path,
            metadata,
            source: FetchSource::Network,
        })
    }

    /// Drop the cached copy of `url`
    pub fn remove(&self, url: &str) -> Result<(), DownloadError> {
        let dir = self.entry_dir(url);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
