// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for outbound hits

mod database;
mod error;
mod hit;
mod query;

pub use database::{HitDatabase, Migration, ID_COLUMN, TIMESTAMP_COLUMN};
pub use error::HitDatabaseError;
pub use hit::{Column, ColumnKind, DatabaseHit, HitRow, HitSchema};
pub use query::Query;
pub use rusqlite::types::Value;
