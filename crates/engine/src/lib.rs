// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! marlin-engine: event hub, rules evaluation, hit queue and remote content

mod config;
mod configuration;
mod dispatcher;
mod error;
mod hit_queue;
mod hub;
mod listener;
pub mod logging;
mod module;
pub mod remote;
mod rules_engine;
mod task_queue;

#[cfg(test)]
mod test_support;

pub use config::{
    HitQueueConfig, HubConfig, LoggingConfig, NetworkConfig, RulesConfig, StorageConfig,
    DEFAULT_SDK_VERSION,
};
pub use configuration::{
    ConfigurationModule, CONFIGURATION_MODULE_NAME, KEY_RETRIEVE_CONFIG, KEY_RULES_URL,
    KEY_UPDATE_CONFIG,
};
pub use dispatcher::ModuleEventDispatcher;
pub use error::{ConfigError, DownloadError, HubError};
pub use hit_queue::{HitProcessor, HitQueue, RetryType};
pub use hub::{EventHub, HubDeps, HUB_SHARED_STATE_NAME, KEY_STATE_OWNER};
pub use listener::{EventListener, EventProcessor};
pub use module::{Module, ModuleContext};
pub use rules_engine::{RulesEngine, CONSEQUENCE_EVENT_NAME};
