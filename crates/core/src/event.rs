// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published through the hub

use crate::clock::{Clock, SystemClock};
use crate::data::EventData;
use crate::event_type::{EventSource, EventType};
use crate::id::{IdGen, UuidIdGen};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable event
///
/// `number` stays `None` until the hub accepts the event for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    name: String,
    #[serde(rename = "type")]
    event_type: EventType,
    source: EventSource,
    data: EventData,
    unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pair_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response_pair_id: Option<String>,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    number: Option<u64>,
}

impl Event {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn source(&self) -> EventSource {
        self.source
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Set on responses: matches the request's `response_pair_id`
    pub fn pair_id(&self) -> Option<&str> {
        self.pair_id.as_deref()
    }

    /// Set on requests that expect a response
    pub fn response_pair_id(&self) -> Option<&str> {
        self.response_pair_id.as_deref()
    }

    /// Milliseconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Whole seconds since the Unix epoch
    pub fn timestamp_secs(&self) -> i64 {
        self.timestamp / 1000
    }

    pub fn number(&self) -> Option<u64> {
        self.number
    }

    /// Same payload under a fresh unique id, not yet dispatched
    pub fn copy(&self) -> Self {
        self.copy_with(&UuidIdGen)
    }

    pub fn copy_with(&self, ids: &impl IdGen) -> Self {
        Self {
            unique_id: ids.next_id(),
            number: None,
            ..self.clone()
        }
    }

    /// Stamps the dispatch sequence number. Only the hub calls this.
    #[doc(hidden)]
    pub fn with_number(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    /// Whether this event matches a (type, source) subscription, honoring wildcards
    pub fn matches(&self, event_type: EventType, source: EventSource) -> bool {
        (event_type.is_wildcard() || event_type == self.event_type)
            && (source.is_wildcard() || source == self.source)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} / {}]", self.name, self.event_type, self.source)?;
        if let Some(number) = self.number {
            write!(f, " #{number}")?;
        }
        Ok(())
    }
}

/// Builds events
#[derive(Debug, Clone)]
pub struct EventBuilder {
    name: String,
    event_type: EventType,
    source: EventSource,
    data: EventData,
    unique_id: Option<String>,
    pair_id: Option<String>,
    response_pair_id: Option<String>,
    timestamp: Option<i64>,
}

impl EventBuilder {
    pub fn new(name: impl Into<String>, event_type: EventType, source: EventSource) -> Self {
        Self {
            name: name.into(),
            event_type,
            source,
            data: EventData::new(),
            unique_id: None,
            pair_id: None,
            response_pair_id: None,
            timestamp: None,
        }
    }

    /// Starts a response paired to `request`
    pub fn response_to(
        request: &Event,
        name: impl Into<String>,
        event_type: EventType,
        source: EventSource,
    ) -> Self {
        let mut builder = Self::new(name, event_type, source);
        builder.pair_id = request.response_pair_id.clone();
        builder
    }

    pub fn data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    pub fn unique_id(mut self, id: impl Into<String>) -> Self {
        self.unique_id = Some(id.into());
        self
    }

    pub fn pair_id(mut self, id: impl Into<String>) -> Self {
        self.pair_id = Some(id.into());
        self
    }

    pub fn response_pair_id(mut self, id: impl Into<String>) -> Self {
        self.response_pair_id = Some(id.into());
        self
    }

    pub fn timestamp(mut self, epoch_millis: i64) -> Self {
        self.timestamp = Some(epoch_millis);
        self
    }

    pub fn build(self) -> Event {
        self.build_with(&SystemClock, &UuidIdGen)
    }

    /// Fills in the unique id and timestamp from the given sources when unset
    pub fn build_with(self, clock: &impl Clock, ids: &impl IdGen) -> Event {
        Event {
            name: self.name,
            event_type: self.event_type,
            source: self.source,
            data: self.data,
            unique_id: self.unique_id.unwrap_or_else(|| ids.next_id()),
            pair_id: self.pair_id,
            response_pair_id: self.response_pair_id,
            timestamp: self.timestamp.unwrap_or_else(|| clock.epoch_millis()),
            number: None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
