// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{%token%}` expansion over events
//!
//! A token names either a key in the event's flattened data or one of the
//! special `~` keys below. Unresolvable tokens expand to the empty string.

use chrono::{DateTime, SecondsFormat};
use marlin_core::{Event, EventData};
use rand::Rng;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%([a-zA-Z0-9_~.()/]*?)%\}").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static URLENC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^urlenc\((.*)\)$").expect("constant regex pattern is valid")
});

const KEY_TYPE: &str = "~type";
const KEY_SOURCE: &str = "~source";
const KEY_TIMESTAMP_UNIX: &str = "~timestampu";
const KEY_TIMESTAMP_ISO: &str = "~timestampz";
const KEY_SDK_VERSION: &str = "~sdkver";
const KEY_CACHEBUST: &str = "~cachebust";
const KEY_ALL_URL: &str = "~all_url";
const KEY_ALL_JSON: &str = "~all_json";
const KEY_STATE_PREFIX: &str = "~state.";

/// What token expansion needs from its host
pub trait TokenContext {
    fn sdk_version(&self) -> String;

    /// Current wall-clock time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Shared state of `owner` as seen by `event`
    fn shared_state(&self, owner: &str, event: &Event) -> Option<EventData>;
}

/// Expands rule keys and `{%token%}` strings
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTokenParser;

impl RuleTokenParser {
    pub fn new() -> Self {
        Self
    }

    /// Resolves one key to a value
    pub fn expand_key(&self, key: &str, event: &Event, ctx: &dyn TokenContext) -> Option<Value> {
        if let Some(caps) = URLENC_PATTERN.captures(key) {
            let inner = self.expand_key(&caps[1], event, ctx)?;
            return Some(Value::String(url_encode(&render(&inner))));
        }

        match key {
            KEY_TYPE => Some(Value::String(event.event_type().name().to_string())),
            KEY_SOURCE => Some(Value::String(event.source().name().to_string())),
            KEY_TIMESTAMP_UNIX => Some(Value::from(ctx.now_millis() / 1000)),
            KEY_TIMESTAMP_ISO => DateTime::from_timestamp_millis(ctx.now_millis())
                .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::Secs, true))),
            KEY_SDK_VERSION => Some(Value::String(ctx.sdk_version())),
            KEY_CACHEBUST => Some(Value::String(
                rand::thread_rng().gen_range(0..100_000_000).to_string(),
            )),
            KEY_ALL_URL => Some(Value::String(url_query(event.data()))),
            KEY_ALL_JSON => Some(Value::String(event.data().to_json_string())),
            _ => match key.strip_prefix(KEY_STATE_PREFIX) {
                Some(rest) => {
                    let (owner, state_key) = rest.split_once('/')?;
                    let state = ctx.shared_state(owner, event)?;
                    state.flatten().remove(state_key)
                }
                None => event.data().flatten().remove(key),
            },
        }
    }

    /// Replaces every `{%key%}` in `input`
    pub fn expand_tokens(&self, input: &str, event: &Event, ctx: &dyn TokenContext) -> String {
        TOKEN_PATTERN
            .replace_all(input, |caps: &regex::Captures| {
                self.expand_key(&caps[1], event, ctx)
                    .map(|v| render(&v))
                    .unwrap_or_default()
            })
            .into_owned()
    }

    /// Expands tokens in every string nested inside `value`
    pub fn expand_value(&self, value: &Value, event: &Event, ctx: &dyn TokenContext) -> Value {
        match value {
            Value::String(s) => Value::String(self.expand_tokens(s, event, ctx)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.expand_value(v, event, ctx))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.expand_value(v, event, ctx)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Renders a value the way tokens print it
///
/// Lists join with commas, maps print as JSON, null prints nothing.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set
pub fn url_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// Leaf values of the flattened data as `k=v` pairs, sorted by key
fn url_query(data: &EventData) -> String {
    let flat = data.flatten();
    let mut pairs: Vec<_> = flat
        .iter()
        .filter(|(_, v)| !v.is_object())
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(&render(v))))
        .collect();
    pairs.sort();
    pairs.join("&")
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
