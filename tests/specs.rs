//! Behavioral specifications for marlin.
//!
//! These tests are black-box: they drive the public API of the engine
//! crates and verify the events, shared states and stored hits that result.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// hub/
#[path = "specs/hub/ordering.rs"]
mod hub_ordering;
#[path = "specs/hub/shared_state.rs"]
mod hub_shared_state;

// rules/
#[path = "specs/rules/bundle.rs"]
mod rules_bundle;

// hit_queue/
#[path = "specs/hit_queue/persistence.rs"]
mod hit_queue_persistence;
