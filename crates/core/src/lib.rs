// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! marlin-core: the event model shared by every marlin crate
//!
//! This crate provides:
//! - `Event` and `EventBuilder`
//! - Interned `EventType` / `EventSource` values
//! - `EventData` payloads and flattening
//! - Versioned shared state history
//! - Clock and id abstractions for deterministic tests

pub mod clock;
pub mod data;
pub mod event;
pub mod event_type;
pub mod id;
pub mod shared_state;

pub use clock::{Clock, FakeClock, SystemClock};
pub use data::EventData;
pub use event::{Event, EventBuilder};
pub use event_type::{EventSource, EventType};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use shared_state::{
    SharedStateEntry, SharedStateError, SharedStateHistory, SharedStateResult,
};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;
}
