// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Event timestamps and rule time tokens read wall-clock time in
//! milliseconds since the Unix epoch.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Wall-clock time in milliseconds since the Unix epoch
    fn epoch_millis(&self) -> i64;

    /// Wall-clock time in whole seconds since the Unix epoch
    fn epoch_secs(&self) -> i64 {
        self.epoch_millis() / 1000
    }
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    epoch_millis: Arc<Mutex<i64>>,
}

impl FakeClock {
    /// Starts at 2026-01-01T00:00:00Z
    pub const DEFAULT_EPOCH_MILLIS: i64 = 1_767_225_600_000;

    pub fn new() -> Self {
        Self::at_epoch_millis(Self::DEFAULT_EPOCH_MILLIS)
    }

    pub fn at_epoch_millis(epoch_millis: i64) -> Self {
        Self {
            epoch_millis: Arc::new(Mutex::new(epoch_millis)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.epoch_millis.lock().unwrap_or_else(|e| e.into_inner()) += duration.as_millis() as i64;
    }

    pub fn set_epoch_millis(&self, epoch_millis: i64) {
        *self.epoch_millis.lock().unwrap_or_else(|e| e.into_inner()) = epoch_millis;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_millis(&self) -> i64 {
        *self.epoch_millis.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
