// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed dispatch facade owned by a module

use crate::error::HubError;
use crate::module::{Module, ModuleContext};
use marlin_core::{Event, EventBuilder, EventData, EventSource, EventType};
use std::marker::PhantomData;

/// Publishes events on behalf of module `M`
pub struct ModuleEventDispatcher<M: Module> {
    ctx: ModuleContext,
    _module: PhantomData<fn() -> M>,
}

impl<M: Module> ModuleEventDispatcher<M> {
    pub fn new(ctx: ModuleContext) -> Self {
        Self {
            ctx,
            _module: PhantomData,
        }
    }

    pub fn context(&self) -> &ModuleContext {
        &self.ctx
    }

    pub fn is_registered(&self) -> bool {
        self.ctx.is_registered()
    }

    pub fn dispatch(&self, event: Event) -> Result<u64, HubError> {
        self.ctx.dispatch(event)
    }

    pub fn dispatch_new(
        &self,
        name: &str,
        event_type: EventType,
        source: EventSource,
        data: EventData,
    ) -> Result<u64, HubError> {
        let event = self
            .ctx
            .build_event(EventBuilder::new(name, event_type, source).data(data));
        self.ctx.dispatch(event)
    }

    /// Dispatches an event paired to `request`
    pub fn dispatch_response(
        &self,
        request: &Event,
        name: &str,
        event_type: EventType,
        source: EventSource,
        data: EventData,
    ) -> Result<u64, HubError> {
        let event = self.ctx.build_event(
            EventBuilder::response_to(request, name, event_type, source).data(data),
        );
        self.ctx.dispatch(event)
    }
}

impl<M: Module> Clone for ModuleEventDispatcher<M> {
    fn clone(&self) -> Self {
        Self::new(self.ctx.clone())
    }
}
