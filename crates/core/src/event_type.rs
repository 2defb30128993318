// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interned event types and event sources
//!
//! Both are open sets: the well-known values below are pre-registered, and
//! `get` registers any other name on first use. Names are normalized to
//! lower case, so lookups are case-insensitive.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex};

/// Prefix shared by all well-known event types
pub const EVENT_TYPE_PREFIX: &str = "com.adobe.eventtype.";
/// Prefix shared by all well-known event sources
pub const EVENT_SOURCE_PREFIX: &str = "com.adobe.eventsource.";

type Table = LazyLock<Mutex<HashMap<String, &'static str>>>;

fn intern(table: &Table, name: &str) -> &'static str {
    let normalized = name.to_ascii_lowercase();
    let mut table = table.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = table.get(&normalized) {
        return existing;
    }
    // Registered names live for the life of the process.
    let leaked: &'static str = Box::leak(normalized.clone().into_boxed_str());
    table.insert(normalized, leaked);
    leaked
}

macro_rules! interned_name {
    (
        $(#[$meta:meta])*
        $ty:ident, $table:ident, [$($konst:ident => $value:literal),* $(,)?]
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $ty(&'static str);

        static $table: Table = LazyLock::new(|| {
            let mut table = HashMap::new();
            $( table.insert($value.to_string(), $value); )*
            Mutex::new(table)
        });

        impl $ty {
            $( pub const $konst: $ty = $ty($value); )*

            /// Returns the registered value for `name`, registering it if new
            pub fn get(name: &str) -> Self {
                Self(intern(&$table, name))
            }

            pub fn name(&self) -> &'static str {
                self.0
            }

            pub fn is_wildcard(&self) -> bool {
                *self == Self::WILDCARD
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(name: &str) -> Self {
                Self::get(name)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                Ok(Self::get(&name))
            }
        }
    };
}

interned_name!(
    /// What happened: the category of an event
    EventType, KNOWN_TYPES, [
        ACQUISITION => "com.adobe.eventtype.acquisition",
        ANALYTICS => "com.adobe.eventtype.analytics",
        AUDIENCE_MANAGER => "com.adobe.eventtype.audiencemanager",
        CAMPAIGN => "com.adobe.eventtype.campaign",
        CONFIGURATION => "com.adobe.eventtype.configuration",
        CUSTOM => "com.adobe.eventtype.custom",
        GENERIC_DATA => "com.adobe.eventtype.generic.data",
        GENERIC_IDENTITY => "com.adobe.eventtype.generic.identity",
        GENERIC_LIFECYCLE => "com.adobe.eventtype.generic.lifecycle",
        GENERIC_PII => "com.adobe.eventtype.generic.pii",
        GENERIC_TRACK => "com.adobe.eventtype.generic.track",
        HUB => "com.adobe.eventtype.hub",
        IDENTITY => "com.adobe.eventtype.identity",
        LIFECYCLE => "com.adobe.eventtype.lifecycle",
        LOCATION => "com.adobe.eventtype.location",
        PII => "com.adobe.eventtype.pii",
        PLACES => "com.adobe.eventtype.places",
        RULES_ENGINE => "com.adobe.eventtype.rulesengine",
        SIGNAL => "com.adobe.eventtype.signal",
        SYSTEM => "com.adobe.eventtype.system",
        TARGET => "com.adobe.eventtype.target",
        USER_PROFILE => "com.adobe.eventtype.userprofile",
        WILDCARD => "com.adobe.eventtype._wildcard_",
    ]
);

interned_name!(
    /// Where an event came from
    EventSource, KNOWN_SOURCES, [
        NONE => "com.adobe.eventsource.none",
        OS => "com.adobe.eventsource.os",
        REQUEST_CONTENT => "com.adobe.eventsource.requestcontent",
        REQUEST_IDENTITY => "com.adobe.eventsource.requestidentity",
        REQUEST_PROFILE => "com.adobe.eventsource.requestprofile",
        REQUEST_RESET => "com.adobe.eventsource.requestreset",
        RESPONSE_CONTENT => "com.adobe.eventsource.responsecontent",
        RESPONSE_IDENTITY => "com.adobe.eventsource.responseidentity",
        RESPONSE_PROFILE => "com.adobe.eventsource.responseprofile",
        SHARED_STATE => "com.adobe.eventsource.sharedstate",
        BOOTED => "com.adobe.eventsource.booted",
        WILDCARD => "com.adobe.eventsource._wildcard_",
    ]
);

#[cfg(test)]
#[path = "event_type_tests.rs"]
mod tests;
