//! Rules bundle specs
//!
//! Verify that rules named by remote configuration are downloaded,
//! registered and evaluated against events and shared state.

use crate::prelude::*;
use marlin_adapters::{FakeNetworkService, NetworkResponse};
use marlin_engine::{ConfigurationModule, CONFIGURATION_MODULE_NAME};

const CONFIG_URL: &str = "https://cdn.spec/config.json";
const RULES_URL: &str = "https://cdn.spec/rules.json";

const RULES: &str = r#"{"version":1,"rules":[{
  "condition": {"type":"group","definition":{"logic":"and","conditions":[
    {"type":"matcher","definition":{"key":"action","matcher":"eq","values":["purchase"]}},
    {"type":"matcher","definition":{"key":"~state.com.adobe.module.configuration/global.privacy","matcher":"eq","values":["optedin"]}}
  ]}},
  "consequences": [{"id":"thanks","type":"pb","detail":{"sdk":"{%~sdkver%}","action":"{%action%}"}}]
}]}"#;

fn serve(network: &FakeNetworkService, privacy: &str) {
    network.respond(
        CONFIG_URL,
        NetworkResponse::new(
            200,
            format!(r#"{{"global.privacy":"{privacy}","rules.url":"{RULES_URL}"}}"#),
        ),
    );
    network.respond(RULES_URL, NetworkResponse::new(200, RULES));
}

fn consequences(heard: &Heard) -> Vec<Event> {
    heard.of(EventType::RULES_ENGINE, EventSource::RESPONSE_CONTENT)
}

#[tokio::test]
async fn downloaded_rules_fire_for_matching_events() {
    let sdk = Sdk::new();
    let network = FakeNetworkService::new();
    serve(&network, "optedin");
    let heard = sdk.listen("com.spec.listener");
    sdk.hub
        .register_module(ConfigurationModule::new(
            network.clone(),
            sdk.data_dir(),
            "rules",
            CONFIG_URL,
        ))
        .unwrap();
    sdk.boot().await;
    wait_for(|| !network.calls_to(RULES_URL).is_empty()).await;

    wait_for(|| {
        sdk.dispatch("buy", event_data! { "action" => "purchase" });
        !consequences(&heard).is_empty()
    })
    .await;

    let detail = consequences(&heard)[0]
        .data()
        .get_data("triggeredconsequence")
        .and_then(|c| c.get_data("detail"))
        .unwrap();
    assert_eq!(detail.get_string("sdk"), Some("2.0.0"));
    assert_eq!(detail.get_string("action"), Some("purchase"));
}

#[tokio::test]
async fn rules_respect_shared_state_conditions() {
    let sdk = Sdk::new();
    let network = FakeNetworkService::new();
    serve(&network, "optedout");
    let heard = sdk.listen("com.spec.listener");
    sdk.hub
        .register_module(ConfigurationModule::new(
            network.clone(),
            sdk.data_dir(),
            "rules",
            CONFIG_URL,
        ))
        .unwrap();
    sdk.boot().await;
    wait_for(|| sdk.hub.has_shared_state(CONFIGURATION_MODULE_NAME)).await;
    wait_for(|| {
        std::fs::read_dir(sdk.data_dir().join("rules"))
            .map(|entries| {
                entries
                    .flatten()
                    .any(|e| e.path().join("contents").join("rules.json").is_file())
            })
            .unwrap_or(false)
    })
    .await;

    for _ in 0..5 {
        sdk.dispatch("buy", event_data! { "action" => "purchase" });
    }
    sdk.dispatch("browse", event_data! { "action" => "view" });
    sdk.settle().await;

    assert!(consequences(&heard).is_empty());
}
