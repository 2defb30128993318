// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers shared by engine unit tests

use crate::config::HubConfig;
use crate::hub::{EventHub, HubDeps};
use crate::module::{Module, ModuleContext};
use marlin_core::{Event, EventSource, EventType, FakeClock, SequentialIdGen};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Setup = Box<dyn Fn(&ModuleContext) + Send + Sync>;

/// Module that records every event it hears
pub(crate) struct RecordingModule {
    name: String,
    version: String,
    recorder: Recorder,
    setup: Option<Setup>,
}

impl RecordingModule {
    pub(crate) fn new(name: &str) -> (Self, Recorder) {
        let recorder = Recorder::default();
        let module = Self {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            recorder: recorder.clone(),
            setup: None,
        };
        (module, recorder)
    }

    /// Extra work done in `on_registered`, after the wildcard listener
    pub(crate) fn with_setup(mut self, setup: impl Fn(&ModuleContext) + Send + Sync + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }
}

impl Module for RecordingModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn on_registered(&self, ctx: &ModuleContext) {
        let recorder = self.recorder.clone();
        ctx.register_wildcard_listener(move |event: &Event, _: &ModuleContext| {
            recorder.events.lock().unwrap().push(event.clone());
        })
        .unwrap();
        *self.recorder.context.lock().unwrap() = Some(ctx.clone());
        if let Some(setup) = &self.setup {
            setup(ctx);
        }
        self.recorder.log("registered");
    }

    fn on_unregistered(&self, _ctx: &ModuleContext) {
        self.recorder.log("unregistered");
    }
}

#[derive(Clone, Default)]
pub(crate) struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    lifecycle: Arc<Mutex<Vec<String>>>,
    context: Arc<Mutex<Option<ModuleContext>>>,
}

impl Recorder {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    pub(crate) fn of(&self, event_type: EventType, source: EventSource) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type() == event_type && e.source() == source)
            .collect()
    }

    pub(crate) fn log(&self, entry: &str) {
        self.lifecycle.lock().unwrap().push(entry.to_string());
    }

    pub(crate) fn lifecycle(&self) -> Vec<String> {
        self.lifecycle.lock().unwrap().clone()
    }

    /// Context handed to the module at registration
    pub(crate) fn context(&self) -> ModuleContext {
        self.context.lock().unwrap().clone().unwrap()
    }
}

/// Started hub with a fake clock and sequential ids
pub(crate) fn test_hub() -> EventHub {
    let hub = EventHub::new(
        &HubConfig {
            sdk_version: "9.9.9".to_string(),
            ..HubConfig::default()
        },
        HubDeps {
            clock: FakeClock::new(),
            ids: SequentialIdGen::new("evt"),
        },
    );
    hub.start().unwrap();
    hub
}

pub(crate) async fn wait_until(condition: impl Fn() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "condition not reached in time");
}
