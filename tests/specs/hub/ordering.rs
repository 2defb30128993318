//! Event ordering specs
//!
//! Verify numbering and delivery order across boot.

use crate::prelude::*;

#[tokio::test]
async fn events_before_boot_follow_the_booted_event() {
    let sdk = Sdk::new();
    let heard = sdk.listen("com.spec.listener");

    sdk.dispatch("first", EventData::new());
    sdk.dispatch("second", EventData::new());
    sdk.boot().await;

    let names = heard.names();
    assert_eq!(names[..3], ["EventHub", "first", "second"]);
    assert_eq!(heard.named("EventHub").number(), Some(0));
}

#[tokio::test]
async fn every_listener_hears_events_in_dispatch_order() {
    let sdk = Sdk::new();
    let a = sdk.listen("com.spec.a");
    let b = sdk.listen("com.spec.b");
    sdk.boot().await;

    let numbers: Vec<u64> = (0..20)
        .map(|i| sdk.dispatch(&format!("e{i}"), event_data! { "i" => i }))
        .collect();
    sdk.settle().await;

    for heard in [&a, &b] {
        let seen: Vec<u64> = heard
            .events()
            .iter()
            .filter(|e| e.name().starts_with('e'))
            .filter_map(Event::number)
            .collect();
        assert_eq!(seen, numbers);
    }
}

#[tokio::test]
async fn hub_state_names_registered_modules() {
    let sdk = Sdk::new();
    sdk.listen("com.spec.listener");
    sdk.boot().await;

    let state = sdk
        .hub
        .get_shared_state(marlin_engine::HUB_SHARED_STATE_NAME, None)
        .into_data()
        .unwrap();

    assert_eq!(state.get_string("version"), Some("2.0.0"));
    assert!(state
        .get_data("extensions")
        .unwrap()
        .contains_key("com.spec.listener"));
}

#[tokio::test]
async fn disposed_hub_refuses_events() {
    let sdk = Sdk::new();
    sdk.listen("com.spec.listener");
    sdk.boot().await;

    assert!(sdk.hub.dispose(Duration::from_secs(2)).await);

    let late = EventBuilder::new("late", EventType::ANALYTICS, EventSource::REQUEST_CONTENT).build();
    assert!(sdk.hub.dispatch(late).is_err());
}
