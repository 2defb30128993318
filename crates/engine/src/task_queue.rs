// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serial task queue backing each module

use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

pub(crate) type Task = Box<dyn FnOnce() + Send>;

/// Runs submitted tasks one at a time, in submission order
pub(crate) struct TaskQueue {
    tx: mpsc::UnboundedSender<Task>,
    handle: JoinHandle<()>,
}

impl TaskQueue {
    /// Must be called from within a tokio runtime
    pub(crate) fn spawn(name: &str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();
        let span = tracing::debug_span!("module.queue", module = %name);
        let handle = tokio::spawn(
            async move {
                while let Some(task) = rx.recv().await {
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        tracing::error!("module task panicked");
                    }
                }
                tracing::debug!("queue closed");
            }
            .instrument(span),
        );
        Self { tx, handle }
    }

    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<Task> {
        self.tx.clone()
    }

    pub(crate) fn submit(&self, task: Task) -> bool {
        self.tx.send(task).is_ok()
    }

    /// Resolves once every task submitted before it has run
    pub(crate) fn barrier(&self) -> oneshot::Receiver<()> {
        let (done, wait) = oneshot::channel();
        self.submit(Box::new(move || {
            let _ = done.send(());
        }));
        wait
    }

    /// Runs what is queued, then stops
    pub(crate) async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "module queue ended abnormally");
        }
    }
}
