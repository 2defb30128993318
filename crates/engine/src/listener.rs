// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener and processor callbacks

use crate::module::ModuleContext;
use marlin_core::Event;

/// Receives events a module subscribed to
///
/// Runs on the owning module's task queue.
pub trait EventListener: Send + Sync + 'static {
    fn hear(&self, event: &Event, ctx: &ModuleContext);
}

impl<F> EventListener for F
where
    F: Fn(&Event, &ModuleContext) + Send + Sync + 'static,
{
    fn hear(&self, event: &Event, ctx: &ModuleContext) {
        self(event, ctx)
    }
}

/// Sees every event before delivery
///
/// Runs on the hub's dispatch loop. Returning `None` blocks the event.
pub trait EventProcessor: Send + Sync + 'static {
    fn process(&self, event: Event) -> Option<Event>;
}

impl<F> EventProcessor for F
where
    F: Fn(Event) -> Option<Event> + Send + Sync + 'static,
{
    fn process(&self, event: Event) -> Option<Event> {
        self(event)
    }
}
