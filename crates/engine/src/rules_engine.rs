// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rules registered by modules, evaluated against every dispatched event

use marlin_core::{Event, EventData, SharedStateHistory};
use marlin_rules::{Rule, TokenContext};
use std::collections::HashMap;

/// Name of events carrying a triggered consequence
pub const CONSEQUENCE_EVENT_NAME: &str = "Rules Consequence Event";

#[derive(Debug, Clone)]
struct RuleSet {
    owner: String,
    rules: Vec<Rule>,
    assets_path: Option<String>,
}

/// Rule sets keyed by owning module, in registration order
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    sets: Vec<RuleSet>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever `owner` registered before
    pub fn register(&mut self, owner: &str, rules: Vec<Rule>, assets_path: Option<String>) {
        let set = RuleSet {
            owner: owner.to_string(),
            rules,
            assets_path,
        };
        match self.sets.iter_mut().find(|s| s.owner == owner) {
            Some(existing) => *existing = set,
            None => self.sets.push(set),
        }
    }

    pub fn unregister(&mut self, owner: &str) -> bool {
        let before = self.sets.len();
        self.sets.retain(|s| s.owner != owner);
        self.sets.len() != before
    }

    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(|s| s.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    /// Consequence payloads for every rule `event` satisfies, tokens expanded
    pub fn evaluate(&self, event: &Event, ctx: &dyn TokenContext) -> Vec<EventData> {
        let mut triggered = Vec::new();
        for set in &self.sets {
            for rule in set.rules.iter().filter(|r| r.evaluate(event, ctx)) {
                for consequence in &rule.consequences {
                    tracing::debug!(
                        owner = %set.owner,
                        consequence = %consequence.id,
                        event = %event,
                        "rule triggered"
                    );
                    triggered.push(
                        consequence
                            .expanded(event, ctx)
                            .to_event_data(set.assets_path.as_deref()),
                    );
                }
            }
        }
        triggered
    }
}

/// Token context backed by the hub's shared states
pub(crate) struct SharedStateTokens<'a> {
    pub(crate) sdk_version: &'a str,
    pub(crate) now_millis: i64,
    pub(crate) states: &'a HashMap<String, SharedStateHistory>,
}

impl TokenContext for SharedStateTokens<'_> {
    fn sdk_version(&self) -> String {
        self.sdk_version.to_string()
    }

    fn now_millis(&self) -> i64 {
        self.now_millis
    }

    fn shared_state(&self, owner: &str, event: &Event) -> Option<EventData> {
        let version = event.number().unwrap_or(SharedStateHistory::LATEST);
        self.states.get(owner)?.resolve(version).into_data()
    }
}

#[cfg(test)]
#[path = "rules_engine_tests.rs"]
mod tests;
