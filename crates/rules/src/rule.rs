// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rules JSON parsing

use crate::condition::RuleCondition;
use crate::consequence::RuleConsequence;
use crate::token::TokenContext;
use marlin_core::Event;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while parsing or loading rules
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unknown matcher: {0}")]
    UnknownMatcher(String),
    #[error("unknown group logic: {0}")]
    UnknownLogic(String),
    #[error("unknown condition type: {0}")]
    UnknownConditionType(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// A condition and the consequences it triggers
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub condition: RuleCondition,
    pub consequences: Vec<RuleConsequence>,
}

impl Rule {
    pub fn from_json(value: &Value) -> Result<Self, RuleError> {
        let condition = RuleCondition::from_json(
            value
                .get("condition")
                .ok_or(RuleError::MissingField("condition"))?,
        )?;
        let consequences = value
            .get("consequences")
            .and_then(Value::as_array)
            .ok_or(RuleError::MissingField("consequences"))?
            .iter()
            .map(RuleConsequence::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            condition,
            consequences,
        })
    }

    pub fn evaluate(&self, event: &Event, ctx: &dyn TokenContext) -> bool {
        self.condition.evaluate(event, ctx)
    }
}

/// Parse `{"version": 1, "rules": [..]}`
///
/// Rules that fail to parse are skipped with a warning; only a malformed
/// document is an error.
pub fn parse_rules(content: &str) -> Result<Vec<Rule>, RuleError> {
    let root: Value = serde_json::from_str(content)?;
    let rules = root
        .get("rules")
        .and_then(Value::as_array)
        .ok_or_else(|| RuleError::InvalidFormat("expected a top-level \"rules\" array".into()))?;

    let mut parsed = Vec::with_capacity(rules.len());
    for (index, raw) in rules.iter().enumerate() {
        match Rule::from_json(raw) {
            Ok(rule) => parsed.push(rule),
            Err(e) => tracing::warn!(index, error = %e, "skipping invalid rule"),
        }
    }
    Ok(parsed)
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
