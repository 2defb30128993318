// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use marlin_adapters::NetworkError;
use marlin_core::SharedStateError;
use marlin_rules::{BundleError, RuleError};
use thiserror::Error;

/// Errors from the event hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("module already registered: {0}")]
    DuplicateModule(String),
    #[error("module not registered: {0}")]
    NotRegistered(String),
    #[error("event hub already started")]
    AlreadyStarted,
    #[error("event hub is stopped")]
    Stopped,
    #[error("event {0} does not expect a response")]
    NoResponseExpected(String),
    #[error("timed out waiting for a response to {0}")]
    ResponseTimeout(String),
    #[error("shared state error for {owner}: {source}")]
    SharedState {
        owner: String,
        #[source]
        source: SharedStateError,
    },
}

/// Errors from remote downloads
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rules error: {0}")]
    Rules(#[from] RuleError),
    #[error("download task failed: {0}")]
    Task(String),
}

/// Errors from configuration and logging setup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("log path has no file name: {0}")]
    InvalidLogPath(String),
    #[error("logging already initialized: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}
