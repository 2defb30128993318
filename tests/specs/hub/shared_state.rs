//! Shared state specs
//!
//! Verify that readers see the state that was current for their event.

use crate::prelude::*;
use marlin_core::SharedStateResult;
use similar_asserts::assert_eq;

#[tokio::test]
async fn reader_sees_state_as_of_its_event() {
    let sdk = Sdk::new();
    let heard = sdk.listen("com.spec.identity");
    sdk.boot().await;
    let owner = heard.context();

    sdk.dispatch("before", EventData::new());
    sdk.settle().await;
    owner
        .set_shared_state_now(event_data! { "ecid" => "first" })
        .unwrap();
    sdk.dispatch("between", EventData::new());
    sdk.settle().await;
    owner
        .set_shared_state_now(event_data! { "ecid" => "second" })
        .unwrap();
    sdk.dispatch("after", EventData::new());
    sdk.settle().await;

    let seen = |name: &str| {
        sdk.hub
            .get_shared_state("com.spec.identity", Some(&heard.named(name)))
            .into_data()
    };
    assert_eq!(seen("before"), None);
    assert_eq!(seen("between"), Some(event_data! { "ecid" => "first" }));
    assert_eq!(seen("after"), Some(event_data! { "ecid" => "second" }));
}

#[tokio::test]
async fn pending_state_resolves_once_updated() {
    let sdk = Sdk::new();
    let heard = sdk.listen("com.spec.identity");
    sdk.boot().await;
    let owner = heard.context();

    let version = owner.create_pending_shared_state(None).unwrap();
    sdk.dispatch("waiting", EventData::new());
    sdk.settle().await;
    let waiting = heard.named("waiting");
    assert_eq!(
        sdk.hub.get_shared_state("com.spec.identity", Some(&waiting)),
        SharedStateResult::Pending
    );

    owner
        .update_shared_state(version, event_data! { "ready" => true })
        .unwrap();

    assert_eq!(
        sdk.hub.get_shared_state("com.spec.identity", Some(&waiting)),
        SharedStateResult::Set(event_data! { "ready" => true })
    );
}

#[tokio::test]
async fn state_changes_are_announced_with_their_owner() {
    let sdk = Sdk::new();
    let heard = sdk.listen("com.spec.identity");
    sdk.boot().await;

    heard
        .context()
        .set_shared_state_now(event_data! { "ecid" => "x" })
        .unwrap();
    sdk.settle().await;

    let owners: Vec<String> = heard
        .of(EventType::HUB, EventSource::SHARED_STATE)
        .iter()
        .filter_map(|e| e.data().get_string(marlin_engine::KEY_STATE_OWNER).map(str::to_string))
        .collect();
    assert_eq!(
        owners,
        vec![
            marlin_engine::HUB_SHARED_STATE_NAME.to_string(),
            "com.spec.identity".to_string(),
        ]
    );
}
