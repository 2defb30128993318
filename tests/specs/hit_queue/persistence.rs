//! Hit queue specs
//!
//! Verify that queued hits survive a restart and are sent oldest first.

use crate::prelude::*;
use async_trait::async_trait;
use marlin_engine::{HitProcessor, HitQueue, HitQueueConfig, RetryType};
use marlin_storage::{
    Column, ColumnKind, DatabaseHit, HitDatabase, HitDatabaseError, HitRow, HitSchema, Value,
};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct Ping {
    base: DatabaseHit,
    body: String,
}

struct PingSchema {
    columns: Vec<Column>,
}

impl HitSchema for PingSchema {
    type Hit = Ping;

    fn table_name(&self) -> &str {
        "PINGS"
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn base<'a>(&self, hit: &'a Ping) -> &'a DatabaseHit {
        &hit.base
    }

    fn to_values(&self, hit: &Ping) -> Vec<Value> {
        vec![Value::Text(hit.body.clone())]
    }

    fn from_row(&self, row: HitRow) -> Result<Ping, HitDatabaseError> {
        Ok(Ping {
            base: row.base(),
            body: row.text(0)?,
        })
    }
}

fn open(path: &Path) -> HitDatabase<PingSchema> {
    HitDatabase::open(
        path,
        PingSchema {
            columns: vec![Column::new("BODY", ColumnKind::Text)],
        },
    )
    .unwrap()
}

#[derive(Clone, Default)]
struct Sender {
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl HitProcessor<Ping> for Sender {
    async fn process(&self, hit: Ping) -> RetryType {
        self.sent.lock().unwrap().push(hit.body);
        RetryType::No
    }
}

fn ping(timestamp: i64, body: &str) -> Ping {
    Ping {
        base: DatabaseHit::new(timestamp),
        body: body.to_string(),
    }
}

#[tokio::test]
async fn hits_queued_offline_are_sent_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pings.sqlite");
    let config = HitQueueConfig::default();

    {
        let queue = HitQueue::new(open(&path), Sender::default(), &config);
        queue.queue(&ping(20, "second")).unwrap();
        queue.queue(&ping(10, "first")).unwrap();
        assert_eq!(queue.size().unwrap(), 2);
        assert!(queue.dispose(Duration::from_secs(1)).await);
    }

    let sender = Sender::default();
    let queue = HitQueue::new(open(&path), sender.clone(), &config);
    assert_eq!(queue.size().unwrap(), 2);
    queue.bring_online();
    wait_for(|| queue.size().unwrap() == 0).await;

    assert_eq!(*sender.sent.lock().unwrap(), vec!["first", "second"]);
    assert!(queue.dispose(Duration::from_secs(1)).await);
}

#[tokio::test]
async fn suspended_queue_holds_hits() {
    let dir = tempfile::tempdir().unwrap();
    let sender = Sender::default();
    let queue = HitQueue::new(
        open(&dir.path().join("pings.sqlite")),
        sender.clone(),
        &HitQueueConfig::default(),
    );

    queue.queue(&ping(1, "held")).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!queue.is_online());
    assert!(sender.sent.lock().unwrap().is_empty());
    assert_eq!(
        queue.select_oldest().unwrap().map(|p| p.body),
        Some("held".to_string())
    );
}
