// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::event_data;
use crate::id::SequentialIdGen;

fn request() -> Event {
    EventBuilder::new("Get ids", EventType::IDENTITY, EventSource::REQUEST_IDENTITY)
        .response_pair_id("pair-7")
        .build()
}

#[test]
fn build_fills_id_and_timestamp_from_sources() {
    let clock = FakeClock::at_epoch_millis(1_000_500);
    let ids = SequentialIdGen::new("evt");
    let event = EventBuilder::new("Launch", EventType::LIFECYCLE, EventSource::REQUEST_CONTENT)
        .data(event_data! { "action" => "start" })
        .build_with(&clock, &ids);

    assert_eq!(event.unique_id(), "evt-1");
    assert_eq!(event.timestamp(), 1_000_500);
    assert_eq!(event.timestamp_secs(), 1_000);
    assert_eq!(event.number(), None);
    assert_eq!(event.data().get_string("action"), Some("start"));
}

#[test]
fn explicit_timestamp_wins() {
    let event = EventBuilder::new("x", EventType::CUSTOM, EventSource::NONE)
        .timestamp(42)
        .build();
    assert_eq!(event.timestamp(), 42);
}

#[test]
fn response_takes_request_response_pair_id() {
    let req = request();
    let resp = EventBuilder::response_to(
        &req,
        "Ids",
        EventType::IDENTITY,
        EventSource::RESPONSE_IDENTITY,
    )
    .build();
    assert_eq!(resp.pair_id(), Some("pair-7"));
    assert_eq!(resp.response_pair_id(), None);
}

#[test]
fn copy_gets_new_id_and_clears_number() {
    let original = request().with_number(9);
    let ids = SequentialIdGen::new("copy");
    let copy = original.copy_with(&ids);
    assert_eq!(copy.unique_id(), "copy-1");
    assert_eq!(copy.number(), None);
    assert_eq!(copy.name(), original.name());
    assert_eq!(copy.response_pair_id(), Some("pair-7"));
}

#[test]
fn wildcard_subscriptions_match_per_axis() {
    let event = request();
    assert!(event.matches(EventType::IDENTITY, EventSource::REQUEST_IDENTITY));
    assert!(event.matches(EventType::WILDCARD, EventSource::REQUEST_IDENTITY));
    assert!(event.matches(EventType::IDENTITY, EventSource::WILDCARD));
    assert!(event.matches(EventType::WILDCARD, EventSource::WILDCARD));
    assert!(!event.matches(EventType::ANALYTICS, EventSource::WILDCARD));
    assert!(!event.matches(EventType::WILDCARD, EventSource::RESPONSE_CONTENT));
}

#[test]
fn display_includes_number_once_dispatched() {
    let event = EventBuilder::new("Ping", EventType::HUB, EventSource::BOOTED).build();
    assert_eq!(
        event.to_string(),
        "Ping [com.adobe.eventtype.hub / com.adobe.eventsource.booted]"
    );
    assert!(event.with_number(3).to_string().ends_with(" #3"));
}

#[test]
fn serializes_type_under_type_key() {
    let event = EventBuilder::new("Ping", EventType::HUB, EventSource::BOOTED)
        .unique_id("u1")
        .timestamp(5)
        .build();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "com.adobe.eventtype.hub");
    assert!(json.get("pair_id").is_none());
    let back: Event = serde_json::from_value(json).unwrap();
    assert_eq!(back, event);
}
