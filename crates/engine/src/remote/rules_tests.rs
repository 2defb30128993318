// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::remote::cache_key;
use marlin_adapters::{FakeNetworkService, NetworkError, NetworkResponse};
use marlin_rules::load_rules_dir;
use std::io::Write;
use std::sync::Mutex;
use zip::write::SimpleFileOptions;

const URL: &str = "https://cdn.test/rules.zip";
const RULES_JSON: &str = r#"{"version":1,"rules":[{"condition":{"type":"matcher","definition":{"key":"a","matcher":"ex"}},"consequences":[{"id":"c","type":"pb","detail":{}}]}]}"#;

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn zip_bundle_is_unpacked_and_announced() {
    let dir = tempfile::tempdir().unwrap();
    let network = FakeNetworkService::new();
    network.respond(
        URL,
        NetworkResponse::new(
            200,
            zip_bytes(&[("rules.json", RULES_JSON), ("assets/banner.txt", "hi")]),
        ),
    );
    let announced = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&announced);
    let downloader = RulesDownloader::new(network, dir.path(), "rules")
        .with_bundle_ready(move |path, url| {
            sink.lock()
                .unwrap()
                .push((path.to_path_buf(), url.to_string()));
        });

    let unpacked = downloader.start_download(URL).await.unwrap().unwrap();

    assert!(unpacked.ends_with(CONTENTS_DIR));
    let loaded = load_rules_dir(&unpacked).unwrap();
    assert_eq!(loaded.rules.len(), 1);
    assert!(loaded.assets_path.is_some());
    assert_eq!(
        *announced.lock().unwrap(),
        vec![(unpacked.clone(), URL.to_string())]
    );
    assert_eq!(downloader.cached_rules(URL), Some(unpacked));
}

#[tokio::test]
async fn plain_json_bundle_becomes_rules_file() {
    let dir = tempfile::tempdir().unwrap();
    let network = FakeNetworkService::new();
    network.respond(URL, NetworkResponse::new(200, RULES_JSON));
    let downloader = RulesDownloader::new(network, dir.path(), "rules");

    let unpacked = downloader.download(URL).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(unpacked.join(RULES_FILE)).unwrap(),
        RULES_JSON
    );
}

#[tokio::test]
async fn unchanged_bundle_reuses_unpacked_rules() {
    let dir = tempfile::tempdir().unwrap();
    let network = FakeNetworkService::new();
    network.respond(URL, NetworkResponse::new(200, RULES_JSON).with_header("ETag", "r1"));
    network.respond(URL, NetworkResponse::new(304, ""));
    let downloader = RulesDownloader::new(network.clone(), dir.path(), "rules");

    let first = downloader.download(URL).await.unwrap();
    let marker = first.join("marker");
    std::fs::write(&marker, "untouched").unwrap();
    let second = downloader.download(URL).await.unwrap();

    assert_eq!(first, second);
    assert!(marker.exists());
    assert_eq!(network.calls_to(URL)[1].header_value("If-None-Match"), Some("r1"));
}

#[tokio::test]
async fn new_bundle_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let network = FakeNetworkService::new();
    network.respond(URL, NetworkResponse::new(200, RULES_JSON));
    network.respond(URL, NetworkResponse::new(200, zip_bytes(&[("rules.json", RULES_JSON)])));
    let downloader = RulesDownloader::new(network, dir.path(), "rules");

    let first = downloader.download(URL).await.unwrap();
    std::fs::write(first.join("stale"), "x").unwrap();
    let second = downloader.download(URL).await.unwrap();

    assert_eq!(first, second);
    assert!(!second.join("stale").exists());
    assert!(second.join(RULES_FILE).is_file());
}

#[tokio::test]
async fn failed_download_without_cache_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let network = FakeNetworkService::new();
    network.fail(URL, NetworkError::Connection("offline".into()));
    let downloader = RulesDownloader::new(network, dir.path(), "rules")
        .with_bundle_ready(|_, _| panic!("nothing should be announced"));

    let result = downloader.start_download(URL).await.unwrap();

    assert!(matches!(result, Err(DownloadError::Network(_))));
    assert!(downloader.cached_rules(URL).is_none());
}

#[tokio::test]
async fn corrupt_bundle_keeps_previous_rules() {
    let dir = tempfile::tempdir().unwrap();
    let network = FakeNetworkService::new();
    network.respond(URL, NetworkResponse::new(200, RULES_JSON));
    network.respond(URL, NetworkResponse::new(200, "<html>oops"));
    let announced = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&announced);
    let downloader = RulesDownloader::new(network, dir.path(), "rules")
        .with_bundle_ready(move |_, _| *sink.lock().unwrap() += 1);

    let first = downloader.download(URL).await.unwrap();
    let second = downloader.download(URL).await;

    assert!(matches!(second, Err(DownloadError::Bundle(_))));
    assert_eq!(*announced.lock().unwrap(), 1);
    assert_eq!(downloader.cached_rules(URL), Some(first.clone()));
    assert_eq!(
        std::fs::read_to_string(first.join(RULES_FILE)).unwrap(),
        RULES_JSON
    );
    let raw = downloader.cache.cached(URL).unwrap();
    assert_eq!(std::fs::read_to_string(raw.path).unwrap(), RULES_JSON);
    assert!(!dir
        .path()
        .join("rules")
        .join(cache_key(URL))
        .join(format!("{CONTENTS_DIR}.staging"))
        .exists());
}
