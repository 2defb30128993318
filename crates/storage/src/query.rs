// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row selection for hit lookups

use rusqlite::types::Value;

/// A `WHERE`/`ORDER BY`/`LIMIT` clause over a hit table
///
/// The selection uses `?` placeholders bound to `args` in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub selection: Option<String>,
    pub args: Vec<Value>,
    pub order_by: Option<String>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(mut self, selection: impl Into<String>, args: Vec<Value>) -> Self {
        self.selection = Some(selection.into());
        self.args = args;
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn where_clause(&self) -> String {
        match &self.selection {
            Some(selection) => format!(" WHERE {selection}"),
            None => String::new(),
        }
    }

    pub(crate) fn tail_clause(&self) -> String {
        let mut sql = String::new();
        if let Some(order) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }
}
