// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Condition trees

use crate::matcher::Matcher;
use crate::rule::RuleError;
use crate::token::TokenContext;
use marlin_core::Event;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

/// A group of conditions or a single matcher
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    Group {
        logic: Logic,
        conditions: Vec<RuleCondition>,
    },
    Matcher(Matcher),
}

impl RuleCondition {
    /// Parses `{"type": "group" | "matcher", "definition": {..}}`
    pub fn from_json(value: &Value) -> Result<Self, RuleError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(RuleError::MissingField("type"))?;
        let definition = value
            .get("definition")
            .ok_or(RuleError::MissingField("definition"))?;

        match kind {
            "group" => {
                let logic = match definition.get("logic").and_then(Value::as_str) {
                    Some("and") => Logic::And,
                    Some("or") => Logic::Or,
                    Some(other) => return Err(RuleError::UnknownLogic(other.to_string())),
                    None => return Err(RuleError::MissingField("logic")),
                };
                let conditions = definition
                    .get("conditions")
                    .and_then(Value::as_array)
                    .ok_or(RuleError::MissingField("conditions"))?
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RuleCondition::Group { logic, conditions })
            }
            "matcher" => Ok(RuleCondition::Matcher(Matcher::from_definition(definition)?)),
            other => Err(RuleError::UnknownConditionType(other.to_string())),
        }
    }

    /// An empty `and` group is true; an empty `or` group is false
    pub fn evaluate(&self, event: &Event, ctx: &dyn TokenContext) -> bool {
        match self {
            RuleCondition::Group {
                logic: Logic::And,
                conditions,
            } => conditions.iter().all(|c| c.evaluate(event, ctx)),
            RuleCondition::Group {
                logic: Logic::Or,
                conditions,
            } => conditions.iter().any(|c| c.evaluate(event, ctx)),
            RuleCondition::Matcher(matcher) => matcher.evaluate(event, ctx),
        }
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
