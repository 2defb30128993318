// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use marlin_adapters::{FakeNetworkService, NetworkError};

const URL: &str = "https://cdn.test/config.json";

fn cache(dir: &Path) -> (FakeNetworkService, RemoteFileCache<FakeNetworkService>) {
    let network = FakeNetworkService::new();
    let cache = RemoteFileCache::new(network.clone(), dir, "config");
    (network, cache)
}

#[test]
fn cache_key_is_hex_sha256() {
    assert_eq!(
        cache_key("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn fresh_download_is_stored_with_validators() {
    let dir = tempfile::tempdir().unwrap();
    let (network, cache) = cache(dir.path());
    network.respond(
        URL,
        NetworkResponse::new(200, r#"{"a":1}"#)
            .with_header("ETag", "\"v1\"")
            .with_header("Last-Modified", "Wed, 01 Jan 2026 00:00:00 GMT"),
    );

    let file = cache.fetch(URL).await.unwrap();

    assert_eq!(file.source, FetchSource::Network);
    assert_eq!(file.path, dir.path().join("config").join(cache_key(URL)).join(CONTENT_FILE));
    assert_eq!(std::fs::read_to_string(&file.path).unwrap(), r#"{"a":1}"#);
    assert_eq!(file.metadata.etag.as_deref(), Some("\"v1\""));
    assert_eq!(cache.cached(URL).unwrap().metadata, file.metadata);
}

#[tokio::test]
async fn revalidation_sends_validators_and_reuses_cache_on_304() {
    let dir = tempfile::tempdir().unwrap();
    let (network, cache) = cache(dir.path());
    network.respond(
        URL,
        NetworkResponse::new(200, "v1")
            .with_header("ETag", "abc")
            .with_header("Last-Modified", "yesterday"),
    );
    network.respond(URL, NetworkResponse::new(304, ""));
    cache.fetch(URL).await.unwrap();

    let file = cache.fetch(URL).await.unwrap();

    assert_eq!(file.source, FetchSource::NotModified);
    assert_eq!(std::fs::read_to_string(&file.path).unwrap(), "v1");
    let second = &network.calls_to(URL)[1];
    assert_eq!(second.header_value("If-None-Match"), Some("abc"));
    assert_eq!(second.header_value("If-Modified-Since"), Some("yesterday"));
}

#[tokio::test]
async fn failures_fall_back_to_cache() {
    let dir = tempfile::tempdir().unwrap();
    let (network, cache) = cache(dir.path());
    network.respond(URL, NetworkResponse::new(200, "kept"));
    network.respond(URL, NetworkResponse::new(500, "oops"));
    network.fail(URL, NetworkError::Connection("offline".into()));
    cache.fetch(URL).await.unwrap();

    let on_error_status = cache.fetch(URL).await.unwrap();
    assert_eq!(on_error_status.source, FetchSource::Fallback);

    let on_network_error = cache.fetch(URL).await.unwrap();
    assert_eq!(on_network_error.source, FetchSource::Fallback);
    assert_eq!(std::fs::read_to_string(&on_network_error.path).unwrap(), "kept");
}

#[tokio::test]
async fn rejected_body_leaves_cache_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (network, cache) = cache(dir.path());
    network.respond(URL, NetworkResponse::new(200, "good").with_header("ETag", "g"));
    network.respond(URL, NetworkResponse::new(200, "bad").with_header("ETag", "b"));
    let accept_good = |staged: PathBuf| async move {
        match tokio::fs::read_to_string(&staged).await?.as_str() {
            "good" => Ok::<(), DownloadError>(()),
            other => Err(DownloadError::Task(format!("unexpected body {other}"))),
        }
    };
    cache.fetch_validated(URL, accept_good).await.unwrap();

    let rejected = cache.fetch_validated(URL, accept_good).await;

    assert!(matches!(rejected, Err(DownloadError::Task(_))));
    let kept = cache.cached(URL).unwrap();
    assert_eq!(std::fs::read_to_string(&kept.path).unwrap(), "good");
    assert_eq!(kept.metadata.etag.as_deref(), Some("g"));
    assert!(!cache.entry_dir(URL).join("content.partial").exists());
}

#[tokio::test]
async fn failures_without_cache_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (network, cache) = cache(dir.path());

    network.respond(URL, NetworkResponse::new(404, ""));
    assert!(matches!(cache.fetch(URL).await, Err(DownloadError::Status(404))));

    network.fail("https://cdn.test/other", NetworkError::Connection("offline".into()));
    assert!(matches!(
        cache.fetch("https://cdn.test/other").await,
        Err(DownloadError::Network(_))
    ));
    assert!(cache.cached(URL).is_none());
}

#[tokio::test]
async fn remove_drops_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let (network, cache) = cache(dir.path());
    network.respond(URL, NetworkResponse::new(200, "x"));
    cache.fetch(URL).await.unwrap();

    cache.remove(URL).unwrap();
    cache.remove(URL).unwrap();

    assert!(cache.cached(URL).is_none());
    assert!(!cache.entry_dir(URL).exists());
}
