// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Misfire policy: a job whose scheduled fire time is further in the past
//! than its grace window is skipped rather than run late. Multiple
//! overdue fires within the window still coalesce into a single run —
//! callers only ever ask "should I run now", never replay a backlog.

use std::time::Duration;

use chrono::{DateTime, Utc};

pub fn should_run(scheduled_at: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> bool {
    let Ok(grace) = chrono::Duration::from_std(grace) else {
        return false;
    };
    now - scheduled_at <= grace
}
