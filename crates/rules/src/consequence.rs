// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What a rule does when its condition holds

use crate::rule::RuleError;
use crate::token::{RuleTokenParser, TokenContext};
use marlin_core::{Event, EventData};
use serde_json::{Map, Value};

pub const KEY_TRIGGERED_CONSEQUENCE: &str = "triggeredconsequence";
pub const KEY_ID: &str = "id";
pub const KEY_TYPE: &str = "type";
pub const KEY_DETAIL: &str = "detail";
pub const KEY_ASSETS_PATH: &str = "assetsPath";

#[derive(Debug, Clone, PartialEq)]
pub struct RuleConsequence {
    pub id: String,
    pub consequence_type: String,
    pub detail: Map<String, Value>,
}

impl RuleConsequence {
    /// Parses `{"id": .., "type": .., "detail": {..}}`
    pub fn from_json(value: &Value) -> Result<Self, RuleError> {
        let id = value
            .get(KEY_ID)
            .and_then(Value::as_str)
            .ok_or(RuleError::MissingField(KEY_ID))?;
        let consequence_type = value
            .get(KEY_TYPE)
            .and_then(Value::as_str)
            .ok_or(RuleError::MissingField(KEY_TYPE))?;
        let detail = value
            .get(KEY_DETAIL)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(Self {
            id: id.to_string(),
            consequence_type: consequence_type.to_string(),
            detail,
        })
    }

    /// Copy with `{%token%}`s in the detail expanded against `event`
    pub fn expanded(&self, event: &Event, ctx: &dyn TokenContext) -> Self {
        let detail = self
            .detail
            .iter()
            .map(|(k, v)| (k.clone(), RuleTokenParser.expand_value(v, event, ctx)))
            .collect();
        Self {
            id: self.id.clone(),
            consequence_type: self.consequence_type.clone(),
            detail,
        }
    }

    /// Payload of the consequence event
    pub fn to_event_data(&self, assets_path: Option<&str>) -> EventData {
        let mut inner = Map::new();
        inner.insert(KEY_ID.to_string(), Value::String(self.id.clone()));
        inner.insert(
            KEY_TYPE.to_string(),
            Value::String(self.consequence_type.clone()),
        );
        inner.insert(KEY_DETAIL.to_string(), Value::Object(self.detail.clone()));
        if let Some(path) = assets_path {
            inner.insert(KEY_ASSETS_PATH.to_string(), Value::String(path.to_string()));
        }
        let mut data = EventData::new();
        data.put_value(KEY_TRIGGERED_CONSEQUENCE, Value::Object(inner));
        data
    }
}

#[cfg(test)]
#[path = "consequence_tests.rs"]
mod tests;
