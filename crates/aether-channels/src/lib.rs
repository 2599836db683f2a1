// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Event-stream debouncer: folds a bursty stream of entity state-change
//! events into a periodic snapshot upsert, so downstream storage sees one
//! write per entity per flush interval instead of one per raw event.

mod debouncer;
mod queue;

pub use debouncer::{Counters, Debouncer, EntitySnapshotSink};
pub use queue::BoundedDropOldestQueue;
