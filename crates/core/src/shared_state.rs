// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned shared state published by modules
//!
//! Versions are event numbers. A history keeps entries in strictly
//! increasing version order; lookups resolve the newest entry at or before
//! a version and follow `Prev`/`Next` markers to a concrete state.

use crate::data::EventData;
use thiserror::Error;

/// One published state
#[derive(Debug, Clone, PartialEq)]
pub enum SharedStateEntry {
    Data(EventData),
    /// Not known yet; a later `update` fills it in
    Pending,
    /// Same as the previous entry
    Prev,
    /// Same as the next concrete entry
    Next,
    /// Explicitly unusable
    Invalid,
}

impl SharedStateEntry {
    pub fn is_pending(&self) -> bool {
        matches!(self, SharedStateEntry::Pending)
    }
}

impl From<EventData> for SharedStateEntry {
    fn from(data: EventData) -> Self {
        SharedStateEntry::Data(data)
    }
}

/// Outcome of a shared-state lookup
#[derive(Debug, Clone, PartialEq)]
pub enum SharedStateResult {
    Set(EventData),
    Pending,
    None,
}

impl SharedStateResult {
    pub fn data(&self) -> Option<&EventData> {
        match self {
            SharedStateResult::Set(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<EventData> {
        match self {
            SharedStateResult::Set(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, SharedStateResult::Set(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SharedStateResult::Pending)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SharedStateError {
    #[error("version {version} is not newer than {latest}")]
    VersionNotIncreasing { version: u64, latest: u64 },
    #[error("no shared state at version {0}")]
    VersionNotFound(u64),
    #[error("shared state at version {0} is not pending")]
    NotPending(u64),
}

/// History of one owner's shared states
#[derive(Debug, Clone, Default)]
pub struct SharedStateHistory {
    entries: Vec<(u64, SharedStateEntry)>,
}

impl SharedStateHistory {
    /// Resolves to the newest entry
    pub const LATEST: u64 = u64::MAX;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn latest_version(&self) -> Option<u64> {
        self.entries.last().map(|(v, _)| *v)
    }

    pub fn create(&mut self, version: u64, entry: SharedStateEntry) -> Result<(), SharedStateError> {
        if let Some(latest) = self.latest_version() {
            if version <= latest {
                return Err(SharedStateError::VersionNotIncreasing { version, latest });
            }
        }
        self.entries.push((version, entry));
        Ok(())
    }

    /// Replaces the pending entry at exactly `version`
    pub fn update(&mut self, version: u64, entry: SharedStateEntry) -> Result<(), SharedStateError> {
        let index = self
            .entries
            .binary_search_by_key(&version, |(v, _)| *v)
            .map_err(|_| SharedStateError::VersionNotFound(version))?;
        let slot = &mut self.entries[index].1;
        if !slot.is_pending() {
            return Err(SharedStateError::NotPending(version));
        }
        *slot = entry;
        Ok(())
    }

    pub fn create_or_update(
        &mut self,
        version: u64,
        entry: SharedStateEntry,
    ) -> Result<(), SharedStateError> {
        if self.entries.iter().any(|(v, _)| *v == version) {
            self.update(version, entry)
        } else {
            self.create(version, entry)
        }
    }

    pub fn resolve(&self, version: u64) -> SharedStateResult {
        let index = self.entries.partition_point(|(v, _)| *v <= version);
        if index == 0 {
            return SharedStateResult::None;
        }
        self.resolve_at(index - 1)
    }

    pub fn latest(&self) -> SharedStateResult {
        self.resolve(Self::LATEST)
    }

    fn resolve_at(&self, mut index: usize) -> SharedStateResult {
        match self.entries[index].1 {
            SharedStateEntry::Prev => loop {
                if index == 0 {
                    return SharedStateResult::None;
                }
                index -= 1;
                if !matches!(self.entries[index].1, SharedStateEntry::Prev) {
                    return self.concrete(index);
                }
            },
            SharedStateEntry::Next => loop {
                index += 1;
                if index >= self.entries.len() {
                    return SharedStateResult::Pending;
                }
                if !matches!(self.entries[index].1, SharedStateEntry::Next) {
                    return self.concrete(index);
                }
            },
            _ => self.concrete(index),
        }
    }

    // A marker pointing the other way (Next reached walking back, Prev
    // reached walking forward) does not resolve.
    fn concrete(&self, index: usize) -> SharedStateResult {
        match &self.entries[index].1 {
            SharedStateEntry::Data(data) => SharedStateResult::Set(data.clone()),
            SharedStateEntry::Pending => SharedStateResult::Pending,
            SharedStateEntry::Invalid | SharedStateEntry::Prev | SharedStateEntry::Next => {
                SharedStateResult::None
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "shared_state_tests.rs"]
mod tests;
