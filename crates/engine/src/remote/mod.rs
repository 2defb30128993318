// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote download and caching

mod cache;
mod configuration;
mod rules;

pub use cache::{
    cache_key, CacheMetadata, CachedFile, FetchSource, RemoteFileCache, CONTENT_FILE,
    METADATA_FILE,
};
pub use configuration::{ConfigurationDownloader, CONFIG_CACHE_FOLDER};
pub use rules::{BundleReady, RulesDownloader, CONTENTS_DIR};
