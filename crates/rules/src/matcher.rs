// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leaf conditions comparing one resolved key against candidate values

use crate::rule::RuleError;
use crate::token::{render, RuleTokenParser, TokenContext};
use marlin_core::Event;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Exists,
    NotExists,
}

impl FromStr for MatcherOp {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" => MatcherOp::Equals,
            "ne" => MatcherOp::NotEquals,
            "gt" => MatcherOp::GreaterThan,
            "ge" => MatcherOp::GreaterThanOrEqual,
            "lt" => MatcherOp::LessThan,
            "le" => MatcherOp::LessThanOrEqual,
            "co" => MatcherOp::Contains,
            "nc" => MatcherOp::NotContains,
            "sw" => MatcherOp::StartsWith,
            "ew" => MatcherOp::EndsWith,
            "ex" => MatcherOp::Exists,
            "nx" => MatcherOp::NotExists,
            other => return Err(RuleError::UnknownMatcher(other.to_string())),
        })
    }
}

impl fmt::Display for MatcherOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatcherOp::Equals => "eq",
            MatcherOp::NotEquals => "ne",
            MatcherOp::GreaterThan => "gt",
            MatcherOp::GreaterThanOrEqual => "ge",
            MatcherOp::LessThan => "lt",
            MatcherOp::LessThanOrEqual => "le",
            MatcherOp::Contains => "co",
            MatcherOp::NotContains => "nc",
            MatcherOp::StartsWith => "sw",
            MatcherOp::EndsWith => "ew",
            MatcherOp::Exists => "ex",
            MatcherOp::NotExists => "nx",
        };
        f.write_str(s)
    }
}

/// `key <op> any of values`
#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    pub key: String,
    pub op: MatcherOp,
    pub values: Vec<Value>,
}

impl Matcher {
    pub fn new(key: impl Into<String>, op: MatcherOp, values: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            op,
            values,
        }
    }

    /// Parses `{"key": .., "matcher": .., "values": [..]}`
    pub fn from_definition(definition: &Value) -> Result<Self, RuleError> {
        let key = definition
            .get("key")
            .and_then(Value::as_str)
            .ok_or(RuleError::MissingField("key"))?;
        let op: MatcherOp = definition
            .get("matcher")
            .and_then(Value::as_str)
            .ok_or(RuleError::MissingField("matcher"))?
            .parse()?;
        let values = match definition.get("values") {
            Some(Value::Array(values)) => values.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![single.clone()],
        };
        Ok(Self::new(key, op, values))
    }

    pub fn evaluate(&self, event: &Event, ctx: &dyn TokenContext) -> bool {
        let resolved = RuleTokenParser
            .expand_key(&self.key, event, ctx)
            .filter(|v| !v.is_null());
        self.matches(resolved.as_ref())
    }

    /// Applies the operator to an already resolved value
    pub fn matches(&self, resolved: Option<&Value>) -> bool {
        match self.op {
            MatcherOp::Exists => resolved.is_some(),
            MatcherOp::NotExists => resolved.is_none(),
            MatcherOp::NotEquals => !self.any(resolved, values_equal),
            MatcherOp::NotContains => !self.any(resolved, contains),
            MatcherOp::Equals => self.any(resolved, values_equal),
            MatcherOp::Contains => self.any(resolved, contains),
            MatcherOp::StartsWith => self.any(resolved, |a, b| lower(a).starts_with(&lower(b))),
            MatcherOp::EndsWith => self.any(resolved, |a, b| lower(a).ends_with(&lower(b))),
            MatcherOp::GreaterThan => self.any(resolved, |a, b| numeric(a, b, |x, y| x > y)),
            MatcherOp::GreaterThanOrEqual => {
                self.any(resolved, |a, b| numeric(a, b, |x, y| x >= y))
            }
            MatcherOp::LessThan => self.any(resolved, |a, b| numeric(a, b, |x, y| x < y)),
            MatcherOp::LessThanOrEqual => self.any(resolved, |a, b| numeric(a, b, |x, y| x <= y)),
        }
    }

    fn any(&self, resolved: Option<&Value>, f: impl Fn(&Value, &Value) -> bool) -> bool {
        match resolved {
            Some(actual) => self.values.iter().any(|expected| f(actual, expected)),
            None => false,
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn lower(value: &Value) -> String {
    render(value).to_lowercase()
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
        return a == b;
    }
    if actual.is_boolean() || expected.is_boolean() {
        return match (as_bool(actual), as_bool(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    lower(actual) == lower(expected)
}

fn contains(actual: &Value, expected: &Value) -> bool {
    lower(actual).contains(&lower(expected))
}

fn numeric(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
