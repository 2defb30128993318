// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Modules and the handle they use to talk to the hub

use crate::error::HubError;
use crate::hub::HubInner;
use crate::listener::{EventListener, EventProcessor};
use marlin_core::{
    Event, EventBuilder, EventData, EventSource, EventType, SharedStateEntry, SharedStateResult,
};
use marlin_rules::Rule;
use std::path::Path;
use std::sync::{Arc, Weak};

/// A unit registered with the hub
///
/// All callbacks for one module run on that module's task queue, never
/// concurrently with each other.
pub trait Module: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Owner name for shared state
    fn shared_state_name(&self) -> &str {
        self.name()
    }

    fn on_registered(&self, _ctx: &ModuleContext) {}

    fn on_unregistered(&self, _ctx: &ModuleContext) {}
}

/// A module's view of the hub
#[derive(Clone)]
pub struct ModuleContext {
    module: String,
    shared_state_name: String,
    hub: Weak<HubInner>,
}

impl ModuleContext {
    pub(crate) fn new(module: String, shared_state_name: String, hub: Weak<HubInner>) -> Self {
        Self {
            module,
            shared_state_name,
            hub,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module
    }

    pub fn shared_state_name(&self) -> &str {
        &self.shared_state_name
    }

    fn hub(&self) -> Result<Arc<HubInner>, HubError> {
        self.hub.upgrade().ok_or(HubError::Stopped)
    }

    pub fn is_registered(&self) -> bool {
        self.hub
            .upgrade()
            .is_some_and(|hub| hub.is_registered(&self.module))
    }

    /// Finish an event with the hub's clock and id source
    pub fn build_event(&self, builder: EventBuilder) -> Event {
        match self.hub.upgrade() {
            Some(hub) => hub.build_event(builder),
            None => builder.build(),
        }
    }

    pub fn dispatch(&self, event: Event) -> Result<u64, HubError> {
        self.hub()?.dispatch(event)
    }

    /// Replaces any listener this module has for the same (type, source)
    pub fn register_listener(
        &self,
        event_type: EventType,
        source: EventSource,
        listener: impl EventListener,
    ) -> Result<(), HubError> {
        self.hub()?
            .register_listener(&self.module, event_type, source, Arc::new(listener))
    }

    pub fn register_wildcard_listener(&self, listener: impl EventListener) -> Result<(), HubError> {
        self.register_listener(EventType::WILDCARD, EventSource::WILDCARD, listener)
    }

    pub fn unregister_listener(
        &self,
        event_type: EventType,
        source: EventSource,
    ) -> Result<bool, HubError> {
        self.hub()?
            .unregister_listener(&self.module, event_type, source)
    }

    pub fn register_processor(&self, processor: impl EventProcessor) -> Result<(), HubError> {
        self.hub()?
            .register_processor(&self.module, Arc::new(processor))
    }

    /// Fires once for the first event whose pair id is `pair_id`
    pub fn register_one_time_listener(
        &self,
        pair_id: impl Into<String>,
        listener: impl FnOnce(&Event) + Send + 'static,
    ) -> Result<(), HubError> {
        self.hub()?
            .register_one_time(pair_id.into(), Box::new(listener));
        Ok(())
    }

    /// Runs `task` on this module's queue after everything already queued
    pub fn add_task(
        &self,
        name: &str,
        task: impl FnOnce() + Send + 'static,
    ) -> Result<(), HubError> {
        self.hub()?.add_task(&self.module, name, Box::new(task))
    }

    /// Version is the event's number, or a fresh number when `event` is `None`
    pub fn create_shared_state(
        &self,
        data: EventData,
        event: Option<&Event>,
    ) -> Result<u64, HubError> {
        self.hub()?
            .create_shared_state(&self.module, &self.shared_state_name, data.into(), event)
    }

    /// Reserve a version to fill in later with `update_shared_state`
    pub fn create_pending_shared_state(&self, event: Option<&Event>) -> Result<u64, HubError> {
        self.hub()?.create_shared_state(
            &self.module,
            &self.shared_state_name,
            SharedStateEntry::Pending,
            event,
        )
    }

    pub fn update_shared_state(&self, version: u64, data: EventData) -> Result<(), HubError> {
        self.hub()?
            .update_shared_state(&self.module, &self.shared_state_name, version, data.into())
    }

    pub fn create_or_update_shared_state(
        &self,
        data: EventData,
        event: Option<&Event>,
    ) -> Result<u64, HubError> {
        self.hub()?.create_or_update_shared_state(
            &self.module,
            &self.shared_state_name,
            data.into(),
            event,
        )
    }

    /// Publish a state that every event dispatched from now on sees
    pub fn set_shared_state_now(&self, data: EventData) -> Result<u64, HubError> {
        self.create_shared_state(data, None)
    }

    pub fn clear_shared_states(&self) -> Result<(), HubError> {
        self.hub()?
            .clear_shared_states(&self.module, &self.shared_state_name)
    }

    /// State of `owner` as seen by `event`, or the newest with no event
    pub fn get_shared_state(&self, owner: &str, event: Option<&Event>) -> SharedStateResult {
        match self.hub.upgrade() {
            Some(hub) => hub.get_shared_state(owner, event),
            None => SharedStateResult::None,
        }
    }

    pub fn has_shared_state(&self, owner: &str) -> bool {
        self.hub
            .upgrade()
            .is_some_and(|hub| hub.has_shared_state(owner))
    }

    /// Replace this module's rules; refused once the module is unregistered
    pub fn register_rules(
        &self,
        rules: Vec<Rule>,
        assets_path: Option<&Path>,
    ) -> Result<(), HubError> {
        let assets = assets_path.map(|p| p.display().to_string());
        self.hub()?.register_module_rules(&self.module, rules, assets)
    }

    pub fn unregister_all_rules(&self) -> Result<(), HubError> {
        self.hub()?.unregister_module_rules(&self.module)
    }
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module", &self.module)
            .field("shared_state_name", &self.shared_state_name)
            .finish()
    }
}
