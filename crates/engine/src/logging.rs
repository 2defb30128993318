// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup

use crate::config::LoggingConfig;
use crate::error::ConfigError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured filter. Keep the returned guard alive
/// for as long as logs should be flushed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard, ConfigError> {
    let (writer, guard) = match &config.log_path {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| ConfigError::InvalidLogPath(path.display().to_string()))?;
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => std::path::PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(filter_for(config))
        .with(fmt::layer().with_writer(writer))
        .try_init()?;

    Ok(guard)
}

fn filter_for(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}
