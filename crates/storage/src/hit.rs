// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hit records and the table schema that stores them

use crate::error::HitDatabaseError;
use rusqlite::types::Value;
use std::fmt;

/// Fields every persisted hit carries
///
/// `identifier` is assigned by the database on insert; hits that have not
/// been queued yet use `DatabaseHit::UNSAVED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatabaseHit {
    pub identifier: i64,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl DatabaseHit {
    pub const UNSAVED: i64 = 0;

    pub fn new(timestamp: i64) -> Self {
        Self {
            identifier: Self::UNSAVED,
            timestamp,
        }
    }
}

/// SQLite storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    Blob,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text => "TEXT",
            ColumnKind::Blob => "BLOB",
        })
    }
}

/// A domain column of a hit table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    /// Extra SQL constraints, e.g. `NOT NULL DEFAULT ''`
    pub constraints: String,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            constraints: String::new(),
        }
    }

    pub fn with_constraints(mut self, constraints: impl Into<String>) -> Self {
        self.constraints = constraints.into();
        self
    }

    pub(crate) fn definition(&self) -> String {
        if self.constraints.is_empty() {
            format!("{} {}", self.name, self.kind)
        } else {
            format!("{} {} {}", self.name, self.kind, self.constraints)
        }
    }
}

/// One stored row: the shared fields plus domain values in column order
#[derive(Debug, Clone, PartialEq)]
pub struct HitRow {
    pub identifier: i64,
    pub timestamp: i64,
    pub values: Vec<Value>,
}

impl HitRow {
    pub fn base(&self) -> DatabaseHit {
        DatabaseHit {
            identifier: self.identifier,
            timestamp: self.timestamp,
        }
    }

    pub fn text(&self, index: usize) -> Result<String, HitDatabaseError> {
        match self.values.get(index) {
            Some(Value::Text(s)) => Ok(s.clone()),
            Some(Value::Null) => Ok(String::new()),
            other => Err(HitDatabaseError::InvalidRow(format!(
                "column {index}: expected text, found {other:?}"
            ))),
        }
    }

    pub fn integer(&self, index: usize) -> Result<i64, HitDatabaseError> {
        match self.values.get(index) {
            Some(Value::Integer(n)) => Ok(*n),
            other => Err(HitDatabaseError::InvalidRow(format!(
                "column {index}: expected integer, found {other:?}"
            ))),
        }
    }

    pub fn real(&self, index: usize) -> Result<f64, HitDatabaseError> {
        match self.values.get(index) {
            Some(Value::Real(n)) => Ok(*n),
            Some(Value::Integer(n)) => Ok(*n as f64),
            other => Err(HitDatabaseError::InvalidRow(format!(
                "column {index}: expected real, found {other:?}"
            ))),
        }
    }

    pub fn blob(&self, index: usize) -> Result<Vec<u8>, HitDatabaseError> {
        match self.values.get(index) {
            Some(Value::Blob(b)) => Ok(b.clone()),
            other => Err(HitDatabaseError::InvalidRow(format!(
                "column {index}: expected blob, found {other:?}"
            ))),
        }
    }
}

/// Maps one hit type to a table
pub trait HitSchema: Send + Sync + 'static {
    type Hit: Clone + Send + Sync + 'static;

    fn table_name(&self) -> &str;

    /// Domain columns; `ID` and `TIMESTAMP` are added by the database
    fn columns(&self) -> &[Column];

    fn base<'a>(&self, hit: &'a Self::Hit) -> &'a DatabaseHit;

    /// Domain values in `columns()` order
    fn to_values(&self, hit: &Self::Hit) -> Vec<Value>;

    fn from_row(&self, row: HitRow) -> Result<Self::Hit, HitDatabaseError>;
}
