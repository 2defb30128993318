//! Shared harness for behavioral specs

pub use marlin_core::{event_data, Event, EventBuilder, EventData, EventSource, EventType};
pub use marlin_engine::{EventHub, HubConfig, HubDeps, Module, ModuleContext};
pub use std::time::Duration;

use marlin_core::{FakeClock, SequentialIdGen};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A started hub with its own data directory
pub struct Sdk {
    pub hub: EventHub,
    dir: TempDir,
}

impl Sdk {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = HubConfig {
            sdk_version: "2.0.0".to_string(),
            ..HubConfig::default()
        };
        let hub = EventHub::new(
            &config,
            HubDeps {
                clock: FakeClock::new(),
                ids: SequentialIdGen::new("spec"),
            },
        );
        hub.start().unwrap();
        Self { hub, dir }
    }

    pub fn data_dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Registers a module that records everything it hears
    pub fn listen(&self, name: &str) -> Heard {
        let heard = Heard::default();
        self.hub
            .register_module(Listener {
                name: name.to_string(),
                heard: heard.clone(),
            })
            .unwrap();
        heard
    }

    pub async fn boot(&self) {
        self.hub.finish_modules_registration().await.unwrap();
        self.hub.flush().await;
    }

    pub fn dispatch(&self, name: &str, data: EventData) -> u64 {
        let event = EventBuilder::new(name, EventType::ANALYTICS, EventSource::REQUEST_CONTENT)
            .data(data)
            .build();
        self.hub.dispatch(event).unwrap()
    }

    /// Waits until every dispatched event has been delivered
    pub async fn settle(&self) {
        self.hub.flush().await;
    }
}

/// Events heard by a `Listener`
#[derive(Clone, Default)]
pub struct Heard {
    events: Arc<Mutex<Vec<Event>>>,
    context: Arc<Mutex<Option<ModuleContext>>>,
}

impl Heard {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    pub fn named(&self, name: &str) -> Event {
        self.events()
            .into_iter()
            .find(|e| e.name() == name)
            .unwrap_or_else(|| panic!("no event named {name}"))
    }

    pub fn of(&self, event_type: EventType, source: EventSource) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type() == event_type && e.source() == source)
            .collect()
    }

    pub fn context(&self) -> ModuleContext {
        self.context.lock().unwrap().clone().unwrap()
    }
}

struct Listener {
    name: String,
    heard: Heard,
}

impl Module for Listener {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn on_registered(&self, ctx: &ModuleContext) {
        let events = Arc::clone(&self.heard.events);
        ctx.register_wildcard_listener(move |event: &Event, _: &ModuleContext| {
            events.lock().unwrap().push(event.clone());
        })
        .unwrap();
        *self.heard.context.lock().unwrap() = Some(ctx.clone());
    }
}

/// Polls `condition` for up to five seconds
pub async fn wait_for(condition: impl Fn() -> bool) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "condition not reached within 5s");
}
