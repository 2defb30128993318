// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use marlin_core::{event_data, EventBuilder, EventData, EventSource, EventType};
use serde_json::json;

struct Ctx;

impl TokenContext for Ctx {
    fn sdk_version(&self) -> String {
        "1.0.0".to_string()
    }

    fn now_millis(&self) -> i64 {
        0
    }

    fn shared_state(&self, _owner: &str, _event: &Event) -> Option<EventData> {
        None
    }
}

fn launch(days: i64) -> Event {
    EventBuilder::new("Lifecycle", EventType::LIFECYCLE, EventSource::RESPONSE_CONTENT)
        .data(event_data! { "lifecyclecontextdata" => {"launchevent": "LaunchEvent", "dayssincefirstuse": days} })
        .build()
}

fn matcher(key: &str, op: &str, values: Value) -> Value {
    json!({"type": "matcher", "definition": {"key": key, "matcher": op, "values": values}})
}

#[test]
fn nested_groups_evaluate() {
    let condition = RuleCondition::from_json(&json!({
        "type": "group",
        "definition": {
            "logic": "and",
            "conditions": [
                matcher("~type", "eq", json!(["com.adobe.eventtype.lifecycle"])),
                {
                    "type": "group",
                    "definition": {
                        "logic": "or",
                        "conditions": [
                            matcher("lifecyclecontextdata.dayssincefirstuse", "gt", json!([30])),
                            matcher("lifecyclecontextdata.launchevent", "eq", json!(["launchevent"])),
                        ]
                    }
                }
            ]
        }
    }))
    .unwrap();

    assert!(condition.evaluate(&launch(1), &Ctx));
    assert!(condition.evaluate(&launch(40), &Ctx));

    let other = EventBuilder::new("x", EventType::ANALYTICS, EventSource::REQUEST_CONTENT).build();
    assert!(!condition.evaluate(&other, &Ctx));
}

#[test]
fn empty_groups() {
    let and = RuleCondition::Group {
        logic: Logic::And,
        conditions: vec![],
    };
    let or = RuleCondition::Group {
        logic: Logic::Or,
        conditions: vec![],
    };
    assert!(and.evaluate(&launch(1), &Ctx));
    assert!(!or.evaluate(&launch(1), &Ctx));
}

#[test]
fn malformed_conditions_are_errors() {
    assert!(matches!(
        RuleCondition::from_json(&json!({"type": "weird", "definition": {}})),
        Err(RuleError::UnknownConditionType(t)) if t == "weird"
    ));
    assert!(matches!(
        RuleCondition::from_json(&json!({"type": "group", "definition": {"logic": "xor", "conditions": []}})),
        Err(RuleError::UnknownLogic(_))
    ));
    assert!(matches!(
        RuleCondition::from_json(&json!({"type": "matcher"})),
        Err(RuleError::MissingField("definition"))
    ));
    // a bad leaf fails the whole tree
    assert!(RuleCondition::from_json(&json!({
        "type": "group",
        "definition": {"logic": "and", "conditions": [matcher("k", "??", json!([]))]}
    }))
    .is_err());
}
