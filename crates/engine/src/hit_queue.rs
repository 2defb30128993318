// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable hit queue
//!
//! Hits are persisted before they are processed. One worker per queue takes
//! the oldest hit, hands it to the processor and acts on the returned
//! `RetryType`.

use crate::config::HitQueueConfig;
use async_trait::async_trait;
use marlin_storage::{HitDatabase, HitDatabaseError, HitSchema, Query, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// What to do with a hit after processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryType {
    /// Done, successfully or not: delete it
    No,
    /// Keep it and retry after the retry delay
    Yes,
    /// Keep it and suspend the queue until `bring_online`
    Break,
}

#[async_trait]
pub trait HitProcessor<H: Send + 'static>: Send + Sync + 'static {
    async fn process(&self, hit: H) -> RetryType;
}

#[derive(Debug, Default)]
struct Flags {
    online: bool,
    disposed: bool,
}

struct Shared<S: HitSchema> {
    db: Mutex<HitDatabase<S>>,
    flags: Mutex<Flags>,
    wake: Notify,
    shutdown: Notify,
    retry_delay: Duration,
}

impl<S: HitSchema> Shared<S> {
    fn db(&self) -> MutexGuard<'_, HitDatabase<S>> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Persistent queue of hits with a background worker
///
/// Starts suspended; call `bring_online` to begin processing.
pub struct HitQueue<S: HitSchema> {
    shared: Arc<Shared<S>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S: HitSchema> HitQueue<S> {
    /// Must be called from within a tokio runtime
    pub fn new(
        db: HitDatabase<S>,
        processor: impl HitProcessor<S::Hit>,
        config: &HitQueueConfig,
    ) -> Self {
        let table = db.schema().table_name().to_string();
        let shared = Arc::new(Shared {
            db: Mutex::new(db),
            flags: Mutex::new(Flags::default()),
            wake: Notify::new(),
            shutdown: Notify::new(),
            retry_delay: config.retry_delay,
        });
        let span = tracing::info_span!("hit_queue", table = %table);
        let worker = tokio::spawn(run_worker(Arc::clone(&shared), processor).instrument(span));
        Self {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Persists `hit` and wakes the worker; returns the row id
    pub fn queue(&self, hit: &S::Hit) -> Result<i64, HitDatabaseError> {
        let id = self.shared.db().queue(hit)?;
        tracing::debug!(id, "hit queued");
        self.shared.wake.notify_one();
        Ok(id)
    }

    pub fn bring_online(&self) {
        self.shared.flags().online = true;
        tracing::debug!("hit queue online");
        self.shared.wake.notify_one();
    }

    /// Stops taking new hits; queued hits stay persisted
    pub fn suspend(&self) {
        self.shared.flags().online = false;
        tracing::debug!("hit queue suspended");
    }

    pub fn is_online(&self) -> bool {
        self.shared.flags().online
    }

    pub fn update_hit(&self, hit: &S::Hit) -> Result<bool, HitDatabaseError> {
        self.shared.db().update_hit(hit)
    }

    pub fn update_all_hits(&self, updates: &[(&str, Value)]) -> Result<usize, HitDatabaseError> {
        self.shared.db().update_all_hits(updates)
    }

    pub fn query_hit(&self, query: &Query) -> Result<Option<S::Hit>, HitDatabaseError> {
        self.shared.db().query_hit(query)
    }

    pub fn select_oldest(&self) -> Result<Option<S::Hit>, HitDatabaseError> {
        self.shared.db().select_oldest()
    }

    pub fn size(&self) -> Result<usize, HitDatabaseError> {
        self.shared.db().size()
    }

    pub fn delete_all_hits(&self) -> Result<usize, HitDatabaseError> {
        self.shared.db().delete_all_hits()
    }

    /// Stops the worker, letting an in-flight hit finish
    ///
    /// Returns whether the worker stopped within `max_wait`.
    pub async fn dispose(&self, max_wait: Duration) -> bool {
        {
            let mut flags = self.shared.flags();
            flags.disposed = true;
            flags.online = false;
        }
        self.shared.shutdown.notify_one();
        self.shared.wake.notify_one();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(worker) = worker else {
            return true;
        };
        match tokio::time::timeout(max_wait, worker).await {
            Ok(_) => {
                tracing::info!("hit queue disposed");
                true
            }
            Err(_) => {
                tracing::warn!(?max_wait, "hit queue worker still busy after dispose wait");
                false
            }
        }
    }
}

impl<S: HitSchema> Drop for HitQueue<S> {
    fn drop(&mut self) {
        self.shared.flags().disposed = true;
        self.shared.shutdown.notify_one();
        self.shared.wake.notify_one();
    }
}

async fn run_worker<S, P>(shared: Arc<Shared<S>>, processor: P)
where
    S: HitSchema,
    P: HitProcessor<S::Hit>,
{
    loop {
        let (online, disposed) = {
            let flags = shared.flags();
            (flags.online, flags.disposed)
        };
        if disposed {
            break;
        }
        if !online {
            shared.wake.notified().await;
            continue;
        }

        let oldest = shared.db().select_oldest();
        let hit = match oldest {
            Ok(Some(hit)) => hit,
            Ok(None) => {
                shared.wake.notified().await;
                continue;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read hit, resetting database");
                if let Err(e) = shared.db().reset() {
                    tracing::error!(error = %e, "database reset failed");
                }
                if sleep_or_shutdown(&shared, shared.retry_delay).await {
                    break;
                }
                continue;
            }
        };

        let id = shared.db().schema().base(&hit).identifier;
        let result = processor.process(hit).await;
        tracing::debug!(id, ?result, "hit processed");

        match result {
            RetryType::No => {
                let deleted = shared.db().delete_hit(id);
                if let Err(e) = deleted {
                    // the hit would be sent again forever otherwise
                    tracing::error!(id, error = %e, "failed to delete processed hit, resetting database");
                    if let Err(e) = shared.db().reset() {
                        tracing::error!(error = %e, "database reset failed");
                    }
                    if sleep_or_shutdown(&shared, shared.retry_delay).await {
                        break;
                    }
                }
            }
            RetryType::Yes => {
                if sleep_or_shutdown(&shared, shared.retry_delay).await {
                    break;
                }
            }
            RetryType::Break => {
                shared.flags().online = false;
                tracing::info!(id, "hit processing suspended");
            }
        }
    }
    tracing::debug!("hit queue worker stopped");
}

/// Returns true when shutdown was requested during the wait
async fn sleep_or_shutdown<S: HitSchema>(shared: &Shared<S>, delay: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => shared.flags().disposed,
        _ = shared.shutdown.notified() => true,
    }
}

#[cfg(test)]
#[path = "hit_queue_tests.rs"]
mod tests;
