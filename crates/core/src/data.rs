// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event payloads
//!
//! `EventData` is a string-keyed map of JSON-like variants. Typed getters
//! return `None` when the stored value has a different kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Payload carried by events and shared states
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData {
    map: Map<String, Value>,
}

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self { map }
    }

    /// Builds from a JSON value; anything but an object yields `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self { map }),
            _ => None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn put_value(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.map.insert(key.into(), value);
        self
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put_value(key, Value::String(value.into()))
    }

    pub fn put_integer(&mut self, key: impl Into<String>, value: i32) -> &mut Self {
        self.put_value(key, Value::from(value))
    }

    pub fn put_long(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.put_value(key, Value::from(value))
    }

    /// Non-finite doubles are stored as null
    pub fn put_double(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.put_value(key, value)
    }

    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.put_value(key, Value::Bool(value))
    }

    pub fn put_list(&mut self, key: impl Into<String>, values: Vec<Value>) -> &mut Self {
        self.put_value(key, Value::Array(values))
    }

    pub fn put_string_map(
        &mut self,
        key: impl Into<String>,
        values: HashMap<String, String>,
    ) -> &mut Self {
        let map = values
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        self.put_value(key, Value::Object(map))
    }

    pub fn put_data(&mut self, key: impl Into<String>, data: EventData) -> &mut Self {
        self.put_value(key, Value::Object(data.map))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(Value::as_str)
    }

    pub fn get_integer(&self, key: &str) -> Option<i32> {
        self.get_long(key).and_then(|v| i32::try_from(v).ok())
    }

    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.map.get(key).and_then(Value::as_i64)
    }

    /// Integers are widened to doubles
    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.map.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.map.get(key).and_then(Value::as_bool)
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.map.get(key).and_then(Value::as_array)
    }

    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.map.get(key).and_then(Value::as_object)
    }

    /// Nested map as `EventData`
    pub fn get_data(&self, key: &str) -> Option<EventData> {
        self.get_map(key).cloned().map(Self::from_map)
    }

    /// Nested map whose values are all strings
    pub fn get_string_map(&self, key: &str) -> Option<HashMap<String, String>> {
        self.get_map(key)?
            .iter()
            .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.map.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.map
    }

    /// Copies every entry of `other` over this map
    pub fn merge(&mut self, other: &EventData) {
        for (k, v) in &other.map {
            self.map.insert(k.clone(), v.clone());
        }
    }

    /// Flattens nested maps into dot-joined keys
    ///
    /// `{"a": {"b": 1}}` becomes `{"a": {"b": 1}, "a.b": 1}`: the nested map
    /// stays addressable under its own key.
    pub fn flatten(&self) -> HashMap<String, Value> {
        let mut flat = HashMap::new();
        flatten_into(&mut flat, None, &self.map);
        flat
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.map.clone()).to_string()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.map.clone())
    }
}

fn flatten_into(flat: &mut HashMap<String, Value>, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let full = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        if let Value::Object(nested) = value {
            flatten_into(flat, Some(&full), nested);
        }
        flat.insert(full, value.clone());
    }
}

impl From<Map<String, Value>> for EventData {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for EventData {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Builds `EventData` from `"key" => json` pairs
///
/// Values are single JSON tokens: literals, `{..}` objects or `[..]` lists.
#[macro_export]
macro_rules! event_data {
    () => { $crate::EventData::new() };
    ($($key:expr => $value:tt),+ $(,)?) => {{
        let mut data = $crate::EventData::new();
        $( data.put_value($key, $crate::__private::json!($value)); )+
        data
    }};
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
