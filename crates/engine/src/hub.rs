// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event hub
//!
//! Events are numbered when dispatched and processed in number order on a
//! single dispatch loop: processors, then one-time listeners, then rules,
//! then delivery to each module's task queue.

use crate::config::HubConfig;
use crate::error::HubError;
use crate::listener::{EventListener, EventProcessor};
use crate::module::{Module, ModuleContext};
use crate::rules_engine::{RulesEngine, SharedStateTokens, CONSEQUENCE_EVENT_NAME};
use crate::task_queue::{Task, TaskQueue};
use marlin_core::{
    Clock, Event, EventBuilder, EventData, EventSource, EventType, IdGen, SharedStateEntry,
    SharedStateHistory, SharedStateResult, SystemClock, UuidIdGen,
};
use marlin_rules::Rule;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Shared state owner name of the hub itself
pub const HUB_SHARED_STATE_NAME: &str = "com.adobe.module.eventhub";

/// Key naming the owner in shared-state change events
pub const KEY_STATE_OWNER: &str = "stateowner";

const BOOTED_EVENT_NAME: &str = "EventHub";
const SHARED_STATE_EVENT_NAME: &str = "Shared state change";

/// Upper bound on flush rounds when listeners keep dispatching
const MAX_FLUSH_ROUNDS: usize = 32;

type EventFactory = Arc<dyn Fn(EventBuilder) -> Event + Send + Sync>;
type WallClock = Arc<dyn Fn() -> i64 + Send + Sync>;
type OneTimeListener = Box<dyn FnOnce(&Event) + Send>;

/// Hub dependencies
pub struct HubDeps<C, I> {
    pub clock: C,
    pub ids: I,
}

impl HubDeps<SystemClock, UuidIdGen> {
    pub fn system() -> Self {
        Self {
            clock: SystemClock,
            ids: UuidIdGen,
        }
    }
}

enum HubCommand {
    Dispatch { event: Event, evaluate_rules: bool },
    Barrier(oneshot::Sender<()>),
    Stop,
}

struct RegisteredModule {
    name: String,
    version: String,
    module: Arc<dyn Module>,
    ctx: ModuleContext,
    listeners: Vec<((EventType, EventSource), Arc<dyn EventListener>)>,
    queue: TaskQueue,
}

struct HubState {
    booted: bool,
    stopped: bool,
    next_number: u64,
    pre_boot: Vec<(Event, bool)>,
    modules: Vec<RegisteredModule>,
    processors: Vec<(String, Arc<dyn EventProcessor>)>,
    one_time: HashMap<String, OneTimeListener>,
    rules: RulesEngine,
    shared_states: HashMap<String, SharedStateHistory>,
}

impl HubState {
    fn new() -> Self {
        Self {
            booted: false,
            stopped: false,
            // 0 belongs to the booted event
            next_number: 1,
            pre_boot: Vec::new(),
            modules: Vec::new(),
            processors: Vec::new(),
            one_time: HashMap::new(),
            rules: RulesEngine::new(),
            shared_states: HashMap::new(),
        }
    }

    fn module(&self, name: &str) -> Option<&RegisteredModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    fn module_mut(&mut self, name: &str) -> Option<&mut RegisteredModule> {
        self.modules.iter_mut().find(|m| m.name == name)
    }

    /// Writes through a module's context are refused once it is unregistered
    fn require_module(&self, name: &str) -> Result<(), HubError> {
        match self.module(name) {
            Some(_) => Ok(()),
            None => Err(HubError::NotRegistered(name.to_string())),
        }
    }

    fn allocate_number(&mut self) -> u64 {
        let number = self.next_number;
        self.next_number += 1;
        number
    }

    /// An event's own number, or a fresh one after everything dispatched so far
    fn version_for(&mut self, event: Option<&Event>) -> u64 {
        match event.and_then(Event::number) {
            Some(number) => number,
            None => self.allocate_number(),
        }
    }
}

pub(crate) struct HubInner {
    sdk_version: String,
    make_event: EventFactory,
    epoch_millis: WallClock,
    state: Mutex<HubState>,
    tx: mpsc::UnboundedSender<HubCommand>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<HubCommand>>>,
    dispatch_loop: Mutex<Option<JoinHandle<()>>>,
}

impl HubInner {
    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn build_event(&self, builder: EventBuilder) -> Event {
        (self.make_event)(builder)
    }

    pub(crate) fn is_registered(&self, module: &str) -> bool {
        self.lock().module(module).is_some()
    }

    /// Numbers `event` and queues it, or holds it until boot
    fn enqueue_locked(&self, state: &mut HubState, event: Event, evaluate_rules: bool) -> u64 {
        let number = state.allocate_number();
        let event = event.with_number(number);
        if state.booted {
            let _ = self.tx.send(HubCommand::Dispatch {
                event,
                evaluate_rules,
            });
        } else {
            state.pre_boot.push((event, evaluate_rules));
        }
        number
    }

    fn enqueue(&self, event: Event, evaluate_rules: bool) -> Result<u64, HubError> {
        let mut state = self.lock();
        if state.stopped {
            return Err(HubError::Stopped);
        }
        Ok(self.enqueue_locked(&mut state, event, evaluate_rules))
    }

    pub(crate) fn dispatch(&self, event: Event) -> Result<u64, HubError> {
        let number = self.enqueue(event, true)?;
        tracing::trace!(number, "event dispatched");
        Ok(number)
    }

    pub(crate) fn register_listener(
        &self,
        module: &str,
        event_type: EventType,
        source: EventSource,
        listener: Arc<dyn EventListener>,
    ) -> Result<(), HubError> {
        let mut state = self.lock();
        let entry = state
            .module_mut(module)
            .ok_or_else(|| HubError::NotRegistered(module.to_string()))?;
        let key = (event_type, source);
        match entry.listeners.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = listener,
            None => entry.listeners.push((key, listener)),
        }
        tracing::debug!(module, %event_type, %source, "listener registered");
        Ok(())
    }

    pub(crate) fn unregister_listener(
        &self,
        module: &str,
        event_type: EventType,
        source: EventSource,
    ) -> Result<bool, HubError> {
        let mut state = self.lock();
        let entry = state
            .module_mut(module)
            .ok_or_else(|| HubError::NotRegistered(module.to_string()))?;
        let before = entry.listeners.len();
        entry.listeners.retain(|(k, _)| *k != (event_type, source));
        Ok(entry.listeners.len() != before)
    }

    pub(crate) fn register_processor(
        &self,
        module: &str,
        processor: Arc<dyn EventProcessor>,
    ) -> Result<(), HubError> {
        let mut state = self.lock();
        if state.module(module).is_none() {
            return Err(HubError::NotRegistered(module.to_string()));
        }
        state.processors.push((module.to_string(), processor));
        Ok(())
    }

    pub(crate) fn register_one_time(&self, pair_id: String, listener: OneTimeListener) {
        self.lock().one_time.insert(pair_id, listener);
    }

    fn remove_one_time(&self, pair_id: &str) {
        self.lock().one_time.remove(pair_id);
    }

    pub(crate) fn add_task(&self, module: &str, name: &str, task: Task) -> Result<(), HubError> {
        let state = self.lock();
        let entry = state
            .module(module)
            .ok_or_else(|| HubError::NotRegistered(module.to_string()))?;
        tracing::trace!(module, task = name, "task queued");
        if entry.queue.submit(task) {
            Ok(())
        } else {
            Err(HubError::NotRegistered(module.to_string()))
        }
    }

    pub(crate) fn create_shared_state(
        &self,
        module: &str,
        owner: &str,
        entry: SharedStateEntry,
        event: Option<&Event>,
    ) -> Result<u64, HubError> {
        let mut state = self.lock();
        state.require_module(module)?;
        let version = state.version_for(event);
        let announce = !entry.is_pending();
        state
            .shared_states
            .entry(owner.to_string())
            .or_default()
            .create(version, entry)
            .map_err(|source| HubError::SharedState {
                owner: owner.to_string(),
                source,
            })?;
        tracing::debug!(owner, version, "shared state created");
        if announce {
            self.announce_locked(&mut state, owner);
        }
        Ok(version)
    }

    pub(crate) fn update_shared_state(
        &self,
        module: &str,
        owner: &str,
        version: u64,
        entry: SharedStateEntry,
    ) -> Result<(), HubError> {
        let mut state = self.lock();
        state.require_module(module)?;
        let announce = !entry.is_pending();
        state
            .shared_states
            .entry(owner.to_string())
            .or_default()
            .update(version, entry)
            .map_err(|source| HubError::SharedState {
                owner: owner.to_string(),
                source,
            })?;
        tracing::debug!(owner, version, "shared state updated");
        if announce {
            self.announce_locked(&mut state, owner);
        }
        Ok(())
    }

    pub(crate) fn create_or_update_shared_state(
        &self,
        module: &str,
        owner: &str,
        entry: SharedStateEntry,
        event: Option<&Event>,
    ) -> Result<u64, HubError> {
        let mut state = self.lock();
        state.require_module(module)?;
        let version = state.version_for(event);
        let announce = !entry.is_pending();
        state
            .shared_states
            .entry(owner.to_string())
            .or_default()
            .create_or_update(version, entry)
            .map_err(|source| HubError::SharedState {
                owner: owner.to_string(),
                source,
            })?;
        if announce {
            self.announce_locked(&mut state, owner);
        }
        Ok(version)
    }

    pub(crate) fn clear_shared_states(&self, module: &str, owner: &str) -> Result<(), HubError> {
        let mut state = self.lock();
        state.require_module(module)?;
        if let Some(history) = state.shared_states.get_mut(owner) {
            history.clear();
            tracing::debug!(owner, "shared states cleared");
            self.announce_locked(&mut state, owner);
        }
        Ok(())
    }

    pub(crate) fn get_shared_state(&self, owner: &str, event: Option<&Event>) -> SharedStateResult {
        let version = event
            .and_then(Event::number)
            .unwrap_or(SharedStateHistory::LATEST);
        self.lock()
            .shared_states
            .get(owner)
            .map_or(SharedStateResult::None, |history| history.resolve(version))
    }

    pub(crate) fn has_shared_state(&self, owner: &str) -> bool {
        self.lock()
            .shared_states
            .get(owner)
            .is_some_and(|history| !history.is_empty())
    }

    fn announce_locked(&self, state: &mut HubState, owner: &str) {
        let mut data = EventData::new();
        data.put_string(KEY_STATE_OWNER, owner);
        let event = self.build_event(
            EventBuilder::new(SHARED_STATE_EVENT_NAME, EventType::HUB, EventSource::SHARED_STATE)
                .data(data),
        );
        self.enqueue_locked(state, event, true);
    }

    pub(crate) fn register_rules(&self, owner: &str, rules: Vec<Rule>, assets_path: Option<String>) {
        let count = rules.len();
        self.lock().rules.register(owner, rules, assets_path);
        tracing::info!(owner, rules = count, "rules registered");
    }

    pub(crate) fn unregister_rules(&self, owner: &str) {
        if self.lock().rules.unregister(owner) {
            tracing::info!(owner, "rules unregistered");
        }
    }

    /// Rules owned by a registered module
    pub(crate) fn register_module_rules(
        &self,
        module: &str,
        rules: Vec<Rule>,
        assets_path: Option<String>,
    ) -> Result<(), HubError> {
        let count = rules.len();
        let mut state = self.lock();
        state.require_module(module)?;
        state.rules.register(module, rules, assets_path);
        tracing::info!(owner = module, rules = count, "rules registered");
        Ok(())
    }

    pub(crate) fn unregister_module_rules(&self, module: &str) -> Result<(), HubError> {
        let mut state = self.lock();
        state.require_module(module)?;
        if state.rules.unregister(module) {
            tracing::info!(owner = module, "rules unregistered");
        }
        Ok(())
    }

    /// The hub's own shared state: sdk version and registered modules
    fn hub_state_data(&self, state: &HubState) -> EventData {
        let extensions: Map<String, Value> = state
            .modules
            .iter()
            .map(|m| {
                let mut info = Map::new();
                info.insert("version".to_string(), Value::String(m.version.clone()));
                (m.name.clone(), Value::Object(info))
            })
            .collect();
        let mut data = EventData::new();
        data.put_string("version", self.sdk_version.clone())
            .put_value("extensions", Value::Object(extensions));
        data
    }

    fn publish_hub_state_locked(&self, state: &mut HubState) {
        let data = self.hub_state_data(state);
        let version = state.allocate_number();
        let created = state
            .shared_states
            .entry(HUB_SHARED_STATE_NAME.to_string())
            .or_default()
            .create(version, data.into());
        match created {
            Ok(()) => self.announce_locked(state, HUB_SHARED_STATE_NAME),
            Err(e) => tracing::warn!(error = %e, "failed to publish hub shared state"),
        }
    }

    /// One pass of the dispatch loop for one event
    fn process(&self, event: Event, evaluate_rules: bool) {
        let number = event.number().unwrap_or_default();
        let processors: Vec<_> = self
            .lock()
            .processors
            .iter()
            .map(|(_, p)| Arc::clone(p))
            .collect();

        let mut event = event;
        for processor in processors {
            match processor.process(event) {
                Some(next) => event = next.with_number(number),
                None => {
                    tracing::debug!(number, "event blocked by processor");
                    return;
                }
            }
        }

        if let Some(pair_id) = event.pair_id() {
            let listener = self.lock().one_time.remove(pair_id);
            if let Some(listener) = listener {
                listener(&event);
            }
        }

        if evaluate_rules {
            let triggered = {
                let state = self.lock();
                if state.rules.is_empty() {
                    Vec::new()
                } else {
                    let tokens = SharedStateTokens {
                        sdk_version: &self.sdk_version,
                        now_millis: (self.epoch_millis)(),
                        states: &state.shared_states,
                    };
                    state.rules.evaluate(&event, &tokens)
                }
            };
            for data in triggered {
                let consequence = self.build_event(
                    EventBuilder::new(
                        CONSEQUENCE_EVENT_NAME,
                        EventType::RULES_ENGINE,
                        EventSource::RESPONSE_CONTENT,
                    )
                    .data(data),
                );
                // Consequences are not fed back into the rules
                if let Err(e) = self.enqueue(consequence, false) {
                    tracing::warn!(error = %e, "dropped rules consequence");
                }
            }
        }

        let targets: Vec<_> = {
            let state = self.lock();
            state
                .modules
                .iter()
                .flat_map(|m| {
                    m.listeners
                        .iter()
                        .filter(|((t, s), _)| event.matches(*t, *s))
                        .map(|(_, l)| (m.queue.sender(), Arc::clone(l), m.ctx.clone()))
                })
                .collect()
        };
        tracing::trace!(number, listeners = targets.len(), event = %event, "delivering");
        for (queue, listener, ctx) in targets {
            let event = event.clone();
            let _ = queue.send(Box::new(move || listener.hear(&event, &ctx)));
        }
    }
}

async fn run_dispatch_loop(hub: Weak<HubInner>, mut rx: mpsc::UnboundedReceiver<HubCommand>) {
    while let Some(command) = rx.recv().await {
        let Some(hub) = hub.upgrade() else {
            break;
        };
        match command {
            HubCommand::Dispatch {
                event,
                evaluate_rules,
            } => hub.process(event, evaluate_rules),
            HubCommand::Barrier(done) => {
                let _ = done.send(());
            }
            HubCommand::Stop => break,
        }
    }
    tracing::info!("dispatch loop stopped");
}

/// Publish/subscribe hub shared by every module
#[derive(Clone)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl EventHub {
    pub fn new<C: Clock, I: IdGen>(config: &HubConfig, deps: HubDeps<C, I>) -> Self {
        let HubDeps { clock, ids } = deps;
        let epoch_millis: WallClock = {
            let clock = clock.clone();
            Arc::new(move || clock.epoch_millis())
        };
        let make_event: EventFactory =
            Arc::new(move |builder: EventBuilder| builder.build_with(&clock, &ids));
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(HubInner {
                sdk_version: config.sdk_version.clone(),
                make_event,
                epoch_millis,
                state: Mutex::new(HubState::new()),
                tx,
                rx: Mutex::new(Some(rx)),
                dispatch_loop: Mutex::new(None),
            }),
        }
    }

    /// Spawns the dispatch loop; must be called from within a tokio runtime
    pub fn start(&self) -> Result<(), HubError> {
        let rx = self
            .inner
            .rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(HubError::AlreadyStarted)?;
        let span = tracing::info_span!("hub.dispatch");
        let handle = tokio::spawn(run_dispatch_loop(Arc::downgrade(&self.inner), rx).instrument(span));
        *self
            .inner
            .dispatch_loop
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(handle);
        tracing::info!(sdk_version = %self.inner.sdk_version, "event hub started");
        Ok(())
    }

    pub fn sdk_version(&self) -> &str {
        &self.inner.sdk_version
    }

    /// Registers `module` and queues its `on_registered`
    pub fn register_module(&self, module: impl Module) -> Result<(), HubError> {
        let module: Arc<dyn Module> = Arc::new(module);
        let name = module.name().to_string();

        let mut state = self.inner.lock();
        if state.stopped {
            return Err(HubError::Stopped);
        }
        if state.module(&name).is_some() {
            return Err(HubError::DuplicateModule(name));
        }

        let ctx = ModuleContext::new(
            name.clone(),
            module.shared_state_name().to_string(),
            Arc::downgrade(&self.inner),
        );
        let queue = TaskQueue::spawn(&name);
        {
            let module = Arc::clone(&module);
            let ctx = ctx.clone();
            queue.submit(Box::new(move || module.on_registered(&ctx)));
        }
        state.modules.push(RegisteredModule {
            name: name.clone(),
            version: module.version().to_string(),
            module,
            ctx,
            listeners: Vec::new(),
            queue,
        });
        if state.booted {
            self.inner.publish_hub_state_locked(&mut state);
        }
        tracing::info!(module = %name, "module registered");
        Ok(())
    }

    pub fn is_registered_module(&self, name: &str) -> bool {
        self.inner.is_registered(name)
    }

    /// Names of registered modules, in registration order
    pub fn registered_modules(&self) -> Vec<String> {
        self.inner
            .lock()
            .modules
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }

    /// Waits for pending registrations, then boots
    ///
    /// Publishes the hub's shared state, dispatches the booted event and
    /// releases events dispatched before boot, in order.
    pub async fn finish_modules_registration(&self) -> Result<(), HubError> {
        let pending: Vec<_> = self
            .inner
            .lock()
            .modules
            .iter()
            .map(|m| m.queue.barrier())
            .collect();
        for registered in pending {
            let _ = registered.await;
        }

        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.stopped {
            return Err(HubError::Stopped);
        }
        if state.booted {
            return Ok(());
        }
        state.booted = true;

        let hub_state = self.inner.hub_state_data(state);
        state
            .shared_states
            .entry(HUB_SHARED_STATE_NAME.to_string())
            .or_default()
            .create(0, hub_state.into())
            .map_err(|source| HubError::SharedState {
                owner: HUB_SHARED_STATE_NAME.to_string(),
                source,
            })?;

        let booted = self
            .inner
            .build_event(EventBuilder::new(
                BOOTED_EVENT_NAME,
                EventType::HUB,
                EventSource::BOOTED,
            ))
            .with_number(0);
        let _ = self.inner.tx.send(HubCommand::Dispatch {
            event: booted,
            evaluate_rules: true,
        });
        let buffered = state.pre_boot.len();
        for (event, evaluate_rules) in state.pre_boot.drain(..) {
            let _ = self.inner.tx.send(HubCommand::Dispatch {
                event,
                evaluate_rules,
            });
        }
        self.inner.announce_locked(state, HUB_SHARED_STATE_NAME);

        tracing::info!(modules = state.modules.len(), buffered, "event hub booted");
        Ok(())
    }

    /// Numbers and queues `event`; returns its number
    pub fn dispatch(&self, event: Event) -> Result<u64, HubError> {
        self.inner.dispatch(event)
    }

    /// Dispatches a request and waits for the event paired to it
    pub async fn dispatch_and_wait_response(
        &self,
        event: Event,
        timeout: Duration,
    ) -> Result<Event, HubError> {
        let pair_id = event
            .response_pair_id()
            .ok_or_else(|| HubError::NoResponseExpected(event.name().to_string()))?
            .to_string();
        let (tx, rx) = oneshot::channel();
        self.inner.register_one_time(
            pair_id.clone(),
            Box::new(move |response: &Event| {
                let _ = tx.send(response.clone());
            }),
        );
        if let Err(e) = self.inner.dispatch(event) {
            self.inner.remove_one_time(&pair_id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            _ => {
                self.inner.remove_one_time(&pair_id);
                Err(HubError::ResponseTimeout(pair_id))
            }
        }
    }

    /// Owner's state as seen by `event`, or the newest with no event
    pub fn get_shared_state(&self, owner: &str, event: Option<&Event>) -> SharedStateResult {
        self.inner.get_shared_state(owner, event)
    }

    pub fn has_shared_state(&self, owner: &str) -> bool {
        self.inner.has_shared_state(owner)
    }

    /// Replaces the rules registered under `owner`
    pub fn register_rules(&self, owner: &str, rules: Vec<Rule>, assets_path: Option<String>) {
        self.inner.register_rules(owner, rules, assets_path);
    }

    pub fn unregister_rules(&self, owner: &str) {
        self.inner.unregister_rules(owner);
    }

    /// Drops every rule set
    pub fn unregister_all_rules(&self) {
        let mut state = self.inner.lock();
        state.rules = RulesEngine::new();
        tracing::info!("all rules unregistered");
    }

    /// Removes the module's listeners, processors and rules, runs its
    /// `on_unregistered`, then stops its queue. Shared states remain.
    pub async fn unregister_module(&self, name: &str) -> Result<(), HubError> {
        let registered = {
            let mut state = self.inner.lock();
            let index = state
                .modules
                .iter()
                .position(|m| m.name == name)
                .ok_or_else(|| HubError::NotRegistered(name.to_string()))?;
            let registered = state.modules.remove(index);
            state.processors.retain(|(owner, _)| owner != name);
            state.rules.unregister(name);
            if state.booted && !state.stopped {
                self.inner.publish_hub_state_locked(&mut state);
            }
            registered
        };

        let RegisteredModule {
            module, ctx, queue, ..
        } = registered;
        queue.submit(Box::new(move || module.on_unregistered(&ctx)));
        queue.close().await;
        tracing::info!(module = name, "module unregistered");
        Ok(())
    }

    /// Waits until the dispatch loop and every module queue have drained
    /// what was submitted before the call, including events those produce.
    pub async fn flush(&self) {
        let started = self
            .inner
            .dispatch_loop
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some();

        for _ in 0..MAX_FLUSH_ROUNDS {
            let before = self.inner.lock().next_number;

            if started {
                let (done, wait) = oneshot::channel();
                if self.inner.tx.send(HubCommand::Barrier(done)).is_err() {
                    return;
                }
                let _ = wait.await;
            }

            let barriers: Vec<_> = self
                .inner
                .lock()
                .modules
                .iter()
                .map(|m| m.queue.barrier())
                .collect();
            for barrier in barriers {
                let _ = barrier.await;
            }

            if self.inner.lock().next_number == before {
                return;
            }
        }
        tracing::warn!("flush gave up while events were still being produced");
    }

    /// Unregisters every module and stops the dispatch loop
    ///
    /// Returns whether shutdown finished within `max_wait`.
    pub async fn dispose(&self, max_wait: Duration) -> bool {
        // Refused from here on, even if shutdown below times out
        self.inner.lock().stopped = true;

        let shutdown = async {
            let names: Vec<String> = self
                .inner
                .lock()
                .modules
                .iter()
                .rev()
                .map(|m| m.name.clone())
                .collect();
            for name in names {
                if let Err(e) = self.unregister_module(&name).await {
                    tracing::warn!(module = %name, error = %e, "unregister during dispose failed");
                }
            }

            let _ = self.inner.tx.send(HubCommand::Stop);
            let handle = self
                .inner
                .dispatch_loop
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take();
            if let Some(handle) = handle {
                let _ = handle.await;
            }
        };

        let finished = tokio::time::timeout(max_wait, shutdown).await.is_ok();
        if finished {
            tracing::info!("event hub disposed");
        } else {
            let _ = self.inner.tx.send(HubCommand::Stop);
            tracing::warn!(?max_wait, "event hub dispose timed out");
        }
        finished
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
