// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration module
//!
//! Publishes remote configuration as shared state. When the configuration
//! names a rules bundle (`rules.url`), the bundle is downloaded and its rules
//! are registered under this module.

use crate::config::HubConfig;
use crate::error::HubError;
use crate::module::{Module, ModuleContext};
use crate::remote::{ConfigurationDownloader, RulesDownloader};
use marlin_adapters::NetworkService;
use marlin_core::{Event, EventBuilder, EventData, EventSource, EventType};
use marlin_rules::load_rules_dir;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const CONFIGURATION_MODULE_NAME: &str = "com.adobe.module.configuration";

/// Configuration key naming the rules bundle
pub const KEY_RULES_URL: &str = "rules.url";
/// Request key: map merged into the current configuration
pub const KEY_UPDATE_CONFIG: &str = "config.update";
/// Request key: answer with the current configuration
pub const KEY_RETRIEVE_CONFIG: &str = "config.getData";

const RESPONSE_EVENT_NAME: &str = "Configuration Response";

#[derive(Default)]
struct ConfigState {
    current: EventData,
    rules_url: Option<String>,
}

/// Built-in module owning remote configuration and its rules
pub struct ConfigurationModule<N> {
    config: ConfigurationDownloader<N>,
    rules: RulesDownloader<N>,
    state: Arc<Mutex<ConfigState>>,
}

impl<N: NetworkService> ConfigurationModule<N> {
    pub fn new(network: N, cache_dir: &Path, rules_folder: &str, config_url: impl Into<String>) -> Self {
        Self {
            config: ConfigurationDownloader::new(network.clone(), cache_dir, config_url),
            rules: RulesDownloader::new(network, cache_dir, rules_folder),
            state: Arc::new(Mutex::new(ConfigState::default())),
        }
    }

    /// Caches under `storage.data_dir`, rules in `rules.cache_folder`
    pub fn from_config(network: N, config: &HubConfig, config_url: impl Into<String>) -> Self {
        Self::new(
            network,
            &config.storage.data_dir,
            &config.rules.cache_folder,
            config_url,
        )
    }

    /// Current merged configuration
    pub fn current(&self) -> EventData {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .clone()
    }
}

impl<N: NetworkService> Module for ConfigurationModule<N> {
    fn name(&self) -> &str {
        CONFIGURATION_MODULE_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn on_registered(&self, ctx: &ModuleContext) {
        let rules = {
            let ctx = ctx.clone();
            self.rules
                .clone()
                .with_bundle_ready(move |dir, url| queue_bundle(&ctx, dir, url))
        };
        let updater = ConfigUpdater {
            state: Arc::clone(&self.state),
            rules,
        };

        let listener = updater.clone();
        if let Err(e) = ctx.register_listener(
            EventType::CONFIGURATION,
            EventSource::REQUEST_CONTENT,
            move |event: &Event, ctx: &ModuleContext| listener.handle_request(event, ctx),
        ) {
            tracing::error!(error = %e, "failed to register configuration listener");
        }

        if let Some(cached) = self.config.load_cached_config() {
            tracing::debug!("applying cached configuration");
            updater.apply_json(ctx, &cached);
        }

        // Only the network wait happens off the module's queue
        let downloader = self.config.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            match downloader.download_config().await {
                Ok(content) => {
                    let task_ctx = ctx.clone();
                    let queued = ctx.add_task("apply downloaded configuration", move || {
                        updater.apply_json(&task_ctx, &content)
                    });
                    if let Err(e) = queued {
                        tracing::debug!(error = %e, "configuration arrived after unregister");
                    }
                }
                Err(e) => {
                    tracing::warn!(url = downloader.url(), error = %e, "configuration download failed")
                }
            }
        });
    }
}

#[derive(Clone)]
struct ConfigUpdater<N> {
    state: Arc<Mutex<ConfigState>>,
    rules: RulesDownloader<N>,
}

impl<N: NetworkService> ConfigUpdater<N> {
    fn apply_json(&self, ctx: &ModuleContext, content: &str) {
        match EventData::from_json_str(content) {
            Ok(update) => self.apply(ctx, &update, None),
            Err(e) => tracing::warn!(error = %e, "configuration is not a json object"),
        }
    }

    /// Merge `update`, publish the result, and fetch rules if their url changed
    fn apply(&self, ctx: &ModuleContext, update: &EventData, event: Option<&Event>) {
        let (snapshot, new_rules_url) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.current.merge(update);
            let url = state.current.get_string(KEY_RULES_URL).map(str::to_string);
            let changed = url.is_some() && url != state.rules_url;
            if changed {
                state.rules_url = url.clone();
            }
            (state.current.clone(), url.filter(|_| changed))
        };

        let published = match ctx.create_shared_state(snapshot.clone(), event) {
            Ok(version) => Ok(version),
            Err(HubError::SharedState { source, .. }) if event.is_some() => {
                tracing::debug!(error = %source, "newer configuration state exists, publishing after it");
                ctx.create_shared_state(snapshot, None)
            }
            Err(e) => Err(e),
        };
        match published {
            Ok(version) => tracing::info!(version, "configuration published"),
            Err(e) => tracing::error!(error = %e, "failed to publish configuration"),
        }

        if let Some(url) = new_rules_url {
            tracing::info!(url = %url, "rules url changed");
            self.rules.start_download(&url);
        }
    }

    fn handle_request(&self, event: &Event, ctx: &ModuleContext) {
        if let Some(update) = event.data().get_data(KEY_UPDATE_CONFIG) {
            self.apply(ctx, &update, Some(event));
        }
        if event.data().get_bool(KEY_RETRIEVE_CONFIG) == Some(true) {
            let current = self
                .state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .current
                .clone();
            let response = ctx.build_event(
                EventBuilder::response_to(
                    event,
                    RESPONSE_EVENT_NAME,
                    EventType::CONFIGURATION,
                    EventSource::RESPONSE_CONTENT,
                )
                .data(current),
            );
            if let Err(e) = ctx.dispatch(response) {
                tracing::warn!(error = %e, "failed to answer configuration request");
            }
        }
    }
}

/// Reads the unpacked bundle, then registers its rules on the module's queue
fn queue_bundle(ctx: &ModuleContext, dir: &Path, url: &str) {
    let loaded = match load_rules_dir(dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!(url, error = %e, "downloaded rules are unreadable");
            return;
        }
    };
    let task_ctx = ctx.clone();
    let url = url.to_string();
    let queued = ctx.add_task("register downloaded rules", move || {
        if let Err(e) = task_ctx.register_rules(loaded.rules, loaded.assets_path.as_deref()) {
            tracing::warn!(url = %url, error = %e, "failed to register downloaded rules");
        }
    });
    if let Err(e) = queued {
        tracing::debug!(error = %e, "rules arrived after unregister");
    }
}

#[cfg(test)]
#[path = "configuration_tests.rs"]
mod tests;
