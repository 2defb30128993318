// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed hit table
//!
//! Every table gets `ID INTEGER PRIMARY KEY AUTOINCREMENT` and
//! `TIMESTAMP INTEGER NOT NULL` ahead of the schema's domain columns.

use crate::error::HitDatabaseError;
use crate::hit::{HitRow, HitSchema};
use crate::query::Query;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const ID_COLUMN: &str = "ID";
pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";

/// What `migrate_if_needed` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// The table already matched the schema
    Unchanged,
    /// There was no table
    Created,
    /// Shared columns were copied into a rebuilt table
    Migrated,
    /// Copying failed; the table was dropped and recreated empty
    Recreated,
}

/// A persistent table of hits for one schema
pub struct HitDatabase<S: HitSchema> {
    conn: Connection,
    path: Option<PathBuf>,
    schema: S,
}

impl<S: HitSchema> HitDatabase<S> {
    /// Open or create the database at `path`
    ///
    /// A file that cannot be read as a hit database is deleted and
    /// recreated empty.
    pub fn open(path: &Path, schema: S) -> Result<Self, HitDatabaseError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let mut db = Self {
            conn,
            path: Some(path.to_path_buf()),
            schema,
        };
        match db.migrate_if_needed() {
            Ok(outcome) => {
                tracing::debug!(path = %path.display(), ?outcome, "opened hit database")
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "hit database unusable, resetting");
                db.reset()?;
            }
        }
        Ok(db)
    }

    pub fn open_in_memory(schema: S) -> Result<Self, HitDatabaseError> {
        let mut db = Self {
            conn: Connection::open_in_memory()?,
            path: None,
            schema,
        };
        db.migrate_if_needed()?;
        Ok(db)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    fn table(&self) -> &str {
        self.schema.table_name()
    }

    fn column_defs(&self) -> String {
        let mut defs = vec![
            format!("{ID_COLUMN} INTEGER PRIMARY KEY AUTOINCREMENT"),
            format!("{TIMESTAMP_COLUMN} INTEGER NOT NULL"),
        ];
        defs.extend(self.schema.columns().iter().map(|c| c.definition()));
        defs.join(", ")
    }

    fn create_table(&self) -> Result<(), HitDatabaseError> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table(),
            self.column_defs()
        ))?;
        Ok(())
    }

    fn expected_columns(&self) -> Vec<String> {
        let mut names = vec![ID_COLUMN.to_string(), TIMESTAMP_COLUMN.to_string()];
        names.extend(self.schema.columns().iter().map(|c| c.name.clone()));
        names
    }

    fn existing_columns(&self) -> Result<Vec<String>, HitDatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", self.table()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Bring an existing table in line with the schema
    pub fn migrate_if_needed(&mut self) -> Result<Migration, HitDatabaseError> {
        let existing = self.existing_columns()?;
        if existing.is_empty() {
            self.create_table()?;
            return Ok(Migration::Created);
        }

        let expected = self.expected_columns();
        let same = existing.len() == expected.len()
            && existing
                .iter()
                .zip(&expected)
                .all(|(a, b)| a.eq_ignore_ascii_case(b));
        if same {
            return Ok(Migration::Unchanged);
        }

        match self.rebuild(&existing, &expected) {
            Ok(()) => {
                tracing::info!(table = self.table(), "migrated hit table");
                Ok(Migration::Migrated)
            }
            Err(e) => {
                tracing::warn!(table = self.table(), error = %e, "migration failed, recreating table");
                self.conn
                    .execute_batch(&format!("DROP TABLE IF EXISTS {}", self.table()))?;
                self.create_table()?;
                Ok(Migration::Recreated)
            }
        }
    }

    fn rebuild(&mut self, existing: &[String], expected: &[String]) -> Result<(), HitDatabaseError> {
        let table = self.table().to_string();
        let old = format!("{table}_old");
        let shared: Vec<&String> = expected
            .iter()
            .filter(|name| existing.iter().any(|e| e.eq_ignore_ascii_case(name)))
            .collect();
        let shared = shared
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let defs = self.column_defs();

        // dropping the transaction without commit rolls every step back
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {old}; ALTER TABLE {table} RENAME TO {old};"
        ))?;
        tx.execute_batch(&format!("CREATE TABLE {table} ({defs})"))?;
        if !shared.is_empty() {
            tx.execute_batch(&format!(
                "INSERT INTO {table} ({shared}) SELECT {shared} FROM {old}"
            ))?;
        }
        tx.execute_batch(&format!("DROP TABLE {old}"))?;
        tx.commit()?;
        Ok(())
    }

    /// Drop all data and start over with an empty table
    ///
    /// File-backed databases delete the file (and its journal) and reopen.
    pub fn reset(&mut self) -> Result<(), HitDatabaseError> {
        if let Some(path) = self.path.clone() {
            // release the file handle before deleting
            let old = std::mem::replace(&mut self.conn, Connection::open_in_memory()?);
            drop(old);
            for file in [
                path.clone(),
                sidecar(&path, "-journal"),
                sidecar(&path, "-wal"),
                sidecar(&path, "-shm"),
            ] {
                remove_if_exists(&file)?;
            }
            self.conn = Connection::open(&path)?;
        } else {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {}", self.table()))?;
        }
        self.create_table()
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM {}",
            self.expected_columns().join(", "),
            self.table()
        )
    }

    /// Insert a hit; returns its new identifier
    pub fn queue(&self, hit: &S::Hit) -> Result<i64, HitDatabaseError> {
        let columns = self.schema.columns();
        let mut values = vec![Value::Integer(self.schema.base(hit).timestamp)];
        values.extend(self.schema.to_values(hit));
        if values.len() != columns.len() + 1 {
            return Err(HitDatabaseError::InvalidRow(format!(
                "expected {} values, got {}",
                columns.len(),
                values.len() - 1
            )));
        }

        let mut names = vec![TIMESTAMP_COLUMN];
        names.extend(columns.iter().map(|c| c.name.as_str()));
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table(),
                names.join(", "),
                placeholders.join(", ")
            ),
            params_from_iter(values.iter()),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All hits matching `query`
    pub fn query_hits(&self, query: &Query) -> Result<Vec<S::Hit>, HitDatabaseError> {
        let sql = format!(
            "{}{}{}",
            self.select_sql(),
            query.where_clause(),
            query.tail_clause()
        );
        let width = self.schema.columns().len();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(query.args.iter()), |row| {
            read_row(row, width)
        })?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(self.schema.from_row(row?)?);
        }
        Ok(hits)
    }

    /// First hit matching `query`
    pub fn query_hit(&self, query: &Query) -> Result<Option<S::Hit>, HitDatabaseError> {
        let query = query.clone().limit(1);
        Ok(self.query_hits(&query)?.into_iter().next())
    }

    /// Lowest timestamp first, ties broken by insertion order
    pub fn select_oldest(&self) -> Result<Option<S::Hit>, HitDatabaseError> {
        self.query_hit(&Query::new().order_by(format!("{TIMESTAMP_COLUMN} ASC, {ID_COLUMN} ASC")))
    }

    /// Rewrite a stored hit by identifier; false if it no longer exists
    pub fn update_hit(&self, hit: &S::Hit) -> Result<bool, HitDatabaseError> {
        let base = *self.schema.base(hit);
        let columns = self.schema.columns();
        let mut values = vec![Value::Integer(base.timestamp)];
        values.extend(self.schema.to_values(hit));
        if values.len() != columns.len() + 1 {
            return Err(HitDatabaseError::InvalidRow(format!(
                "expected {} values, got {}",
                columns.len(),
                values.len() - 1
            )));
        }

        let mut assignments = vec![format!("{TIMESTAMP_COLUMN} = ?1")];
        assignments.extend(
            columns
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{} = ?{}", c.name, i + 2)),
        );
        values.push(Value::Integer(base.identifier));
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE {ID_COLUMN} = ?{}",
                self.table(),
                assignments.join(", "),
                values.len()
            ),
            params_from_iter(values.iter()),
        )?;
        Ok(changed > 0)
    }

    /// Set the given columns on every row; returns the number of rows changed
    pub fn update_all_hits(&self, updates: &[(&str, Value)]) -> Result<usize, HitDatabaseError> {
        if updates.is_empty() {
            return Ok(0);
        }
        for (name, _) in updates {
            let known = name.eq_ignore_ascii_case(TIMESTAMP_COLUMN)
                || self
                    .schema
                    .columns()
                    .iter()
                    .any(|c| c.name.eq_ignore_ascii_case(name));
            if !known {
                return Err(HitDatabaseError::UnknownColumn(name.to_string()));
            }
        }
        let assignments: Vec<String> = updates
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{name} = ?{}", i + 1))
            .collect();
        let changed = self.conn.execute(
            &format!("UPDATE {} SET {}", self.table(), assignments.join(", ")),
            params_from_iter(updates.iter().map(|(_, v)| v)),
        )?;
        Ok(changed)
    }

    pub fn delete_hit(&self, identifier: i64) -> Result<bool, HitDatabaseError> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE {ID_COLUMN} = ?1", self.table()),
            params![identifier],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_all_hits(&self) -> Result<usize, HitDatabaseError> {
        Ok(self
            .conn
            .execute(&format!("DELETE FROM {}", self.table()), [])?)
    }

    /// Drop the table; `migrate_if_needed` or `reset` recreates it
    pub fn delete_table(&self) -> Result<(), HitDatabaseError> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", self.table()))?;
        Ok(())
    }

    pub fn size(&self) -> Result<usize, HitDatabaseError> {
        self.size_for(&Query::new())
    }

    /// Number of rows matching the query's selection
    pub fn size_for(&self, query: &Query) -> Result<usize, HitDatabaseError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}{}", self.table(), query.where_clause()),
            params_from_iter(query.args.iter()),
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }
}

fn read_row(row: &Row<'_>, width: usize) -> rusqlite::Result<HitRow> {
    let values = (0..width)
        .map(|i| row.get::<_, Value>(i + 2))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HitRow {
        identifier: row.get(0)?,
        timestamp: row.get(1)?,
        values,
    })
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> Result<(), io::Error> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;
