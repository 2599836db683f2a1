// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Built-in job definitions and their misfire grace windows.

use std::str::FromStr;
use std::time::Duration;

use cron::Schedule;

pub const BUILT_IN_TRACE_EVAL_CRON: &str = "0 2 * * *";
pub const BUILT_IN_RETENTION_CRON: &str = "30 3 * * *";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTrigger {
    Cron(String),
    Interval(Duration),
}

#[derive(Debug, Clone)]
pub struct JobSpec {
    pub id: &'static str,
    pub trigger: JobTrigger,
    pub misfire_grace: Duration,
}

/// Validate a 5-field cron expression (minute hour day month weekday) by
/// widening it with a leading seconds field and handing it to the `cron`
/// crate's parser, which only accepts 6/7-field expressions.
pub fn validate_cron_expression(expr: &str) -> bool {
    Schedule::from_str(&format!("0 {expr}")).is_ok()
}

/// The four jobs registered at startup, independent of any `InsightSchedule`
/// rows (those are synced separately via [`crate::registry::JobRegistry::sync_insight_schedules`]).
pub fn built_in_jobs(discovery_interval: Duration) -> Vec<JobSpec> {
    vec![
        JobSpec {
            id: "discovery_sync",
            trigger: JobTrigger::Interval(discovery_interval),
            misfire_grace: Duration::from_secs(300),
        },
        JobSpec {
            id: "trace_evaluation",
            trigger: JobTrigger::Cron(BUILT_IN_TRACE_EVAL_CRON.to_string()),
            misfire_grace: Duration::from_secs(600),
        },
        JobSpec {
            id: "data_retention",
            trigger: JobTrigger::Cron(BUILT_IN_RETENTION_CRON.to_string()),
            misfire_grace: Duration::from_secs(600),
        },
    ]
}
