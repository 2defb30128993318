// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from the hit database
#[derive(Debug, Error)]
pub enum HitDatabaseError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
