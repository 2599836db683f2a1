// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Cron/interval job scheduler for the orchestration core's background
//! jobs: insight-schedule sync, discovery sync, trace evaluation, and data
//! retention.
//!
//! The scheduler is a lifecycle singleton gated by [`aether_config::ProcessRole`]
//! — in a multi-replica deployment only one role may own the clock. The
//! timing loop itself lives in [`scheduler`]; [`registry`] and [`misfire`]
//! are pure, independently testable logic the loop calls into.

mod jobs;
mod misfire;
mod registry;
mod scheduler;

pub use jobs::{
    built_in_jobs, validate_cron_expression, JobSpec, JobTrigger, BUILT_IN_RETENTION_CRON,
    BUILT_IN_TRACE_EVAL_CRON,
};
pub use misfire::should_run;
pub use registry::{JobRegistry, RegisteredJob, SyncAction};
pub use scheduler::{Scheduler, SchedulerHandle};
