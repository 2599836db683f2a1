// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! In-memory job table and the insight-schedule reconciliation it runs on
//! every sync. This mirrors an APScheduler-style job store's add/reschedule/
//! remove trio, but kept deliberately dumb: it tracks id → cron expression
//! and nothing about actual timer state, which lives in [`crate::scheduler`].

use std::collections::HashMap;
use std::sync::Mutex;

use aether_memory::InsightSchedule;

use crate::jobs::validate_cron_expression;

const INSIGHT_SCHEDULE_PREFIX: &str = "insight_schedule:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredJob {
    pub id: String,
    pub cron_expression: String,
}

/// What [`JobRegistry::sync_insight_schedules`] did to the table, reported
/// back for logging/testing rather than silently mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Added(String),
    Rescheduled(String),
    Removed(String),
}

#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, RegisteredJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<RegisteredJob> {
        self.jobs.lock().unwrap().get(id).cloned()
    }

    pub fn add(&self, id: impl Into<String>, cron_expression: impl Into<String>) {
        let id = id.into();
        let job = RegisteredJob { id: id.clone(), cron_expression: cron_expression.into() };
        self.jobs.lock().unwrap().insert(id, job);
    }

    pub fn remove(&self, id: &str) {
        self.jobs.lock().unwrap().remove(id);
    }

    /// Reconcile the job table against enabled cron `InsightSchedule` rows.
    /// Idempotent: calling this twice with the same input is a no-op the
    /// second time.
    pub fn sync_insight_schedules(&self, schedules: &[InsightSchedule]) -> Vec<SyncAction> {
        let mut actions = Vec::new();
        let mut guard = self.jobs.lock().unwrap();

        let wanted: HashMap<String, String> = schedules
            .iter()
            .filter(|s| s.enabled)
            .filter_map(|s| s.cron_expression.as_ref().map(|cron| (s.job_id(), cron.clone())))
            .filter(|(_, cron)| validate_cron_expression(cron))
            .collect();

        for (job_id, cron_expression) in &wanted {
            match guard.get(job_id) {
                None => {
                    guard.insert(
                        job_id.clone(),
                        RegisteredJob { id: job_id.clone(), cron_expression: cron_expression.clone() },
                    );
                    actions.push(SyncAction::Added(job_id.clone()));
                }
                Some(existing) if &existing.cron_expression != cron_expression => {
                    guard.insert(
                        job_id.clone(),
                        RegisteredJob { id: job_id.clone(), cron_expression: cron_expression.clone() },
                    );
                    actions.push(SyncAction::Rescheduled(job_id.clone()));
                }
                Some(_) => {}
            }
        }

        let stale: Vec<String> = guard
            .keys()
            .filter(|id| id.starts_with(INSIGHT_SCHEDULE_PREFIX) && !wanted.contains_key(*id))
            .cloned()
            .collect();
        for id in stale {
            guard.remove(&id);
            actions.push(SyncAction::Removed(id));
        }

        actions
    }
}
