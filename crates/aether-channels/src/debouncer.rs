// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The flush loop and last-write-wins `pending` map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::queue::BoundedDropOldestQueue;

#[async_trait]
pub trait EntitySnapshotSink: Send + Sync {
    async fn upsert_batch(&self, batch: HashMap<String, Value>) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: EntitySnapshotSink + ?Sized> EntitySnapshotSink for std::sync::Arc<T> {
    async fn upsert_batch(&self, batch: HashMap<String, Value>) -> anyhow::Result<()> {
        (**self).upsert_batch(batch).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    pub events_received: u64,
    pub events_flushed: u64,
    pub pending_size: usize,
    pub queue_size: usize,
}

pub struct Debouncer<S: EntitySnapshotSink> {
    queue: BoundedDropOldestQueue<(String, Value)>,
    pending: Mutex<HashMap<String, Value>>,
    sink: S,
    flush_interval: Duration,
    events_received: AtomicU64,
    events_flushed: AtomicU64,
    cancel: CancellationToken,
    running_guard: AsyncMutex<()>,
}

impl<S: EntitySnapshotSink + 'static> Debouncer<S> {
    pub fn new(sink: S, capacity: usize, flush_interval: Duration) -> Self {
        Self {
            queue: BoundedDropOldestQueue::new(capacity),
            pending: Mutex::new(HashMap::new()),
            sink,
            flush_interval,
            events_received: AtomicU64::new(0),
            events_flushed: AtomicU64::new(0),
            cancel: CancellationToken::new(),
            running_guard: AsyncMutex::new(()),
        }
    }

    pub fn put(&self, entity_id: impl Into<String>, state: Value) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
        self.queue.push((entity_id.into(), state));
    }

    pub fn counters(&self) -> Counters {
        Counters {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_flushed: self.events_flushed.load(Ordering::Relaxed),
            pending_size: self.pending.lock().unwrap().len(),
            queue_size: self.queue.len(),
        }
    }

    /// Drain the queue into `pending`, then upsert a batch if non-empty.
    /// On persistence failure, the batch is merged back into `pending` so
    /// that anything newer which arrived during the failed write still
    /// wins.
    pub async fn flush_once(&self) {
        for (entity_id, state) in self.queue.drain() {
            self.pending.lock().unwrap().insert(entity_id, state);
        }

        let batch = {
            let mut guard = self.pending.lock().unwrap();
            if guard.is_empty() {
                return;
            }
            std::mem::take(&mut *guard)
        };

        let batch_len = batch.len() as u64;
        match self.sink.upsert_batch(batch.clone()).await {
            Ok(()) => {
                self.events_flushed.fetch_add(batch_len, Ordering::Relaxed);
            }
            Err(err) => {
                error!(error = %err, "entity snapshot upsert failed, re-queuing batch");
                let mut guard = self.pending.lock().unwrap();
                for (entity_id, state) in batch {
                    // Newer post-failure pending entries win over the stale batch.
                    guard.entry(entity_id).or_insert(state);
                }
            }
        }
    }

    /// Launches the periodic flush loop. Returns immediately; the loop runs
    /// until [`Self::stop`] is called.
    pub async fn start(self: &std::sync::Arc<Self>) {
        let _lock = self.running_guard.lock().await;
        let this = std::sync::Arc::clone(self);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.flush_interval);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => this.flush_once().await,
                }
            }
            info!("debouncer flush loop stopped");
        });
    }

    /// Cancels the flush loop, drains the queue into `pending`, and runs one
    /// final flush so nothing buffered is lost.
    pub async fn stop(&self) {
        self.cancel.cancel();
        self.flush_once().await;
    }
}
