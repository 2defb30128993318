// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Rules parsing, evaluation and token expansion

mod bundle;
mod condition;
mod consequence;
mod matcher;
mod rule;
mod token;

pub use bundle::{
    handler_for, load_rules_dir, BundleError, BundleHandler, JsonBundleHandler, LoadedRules,
    ZipBundleHandler, ASSETS_DIR, RULES_FILE,
};
pub use condition::{Logic, RuleCondition};
pub use consequence::{RuleConsequence, KEY_ASSETS_PATH, KEY_TRIGGERED_CONSEQUENCE};
pub use matcher::{Matcher, MatcherOp};
pub use rule::{parse_rules, Rule, RuleError};
pub use token::{render, url_encode, RuleTokenParser, TokenContext};
