// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The scheduler lifecycle singleton: role-gated `start`/`stop`, and the
//! discovery-sync interval that the event debouncer toggles directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use std::str::FromStr;

use aether_config::ProcessRole;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::jobs::built_in_jobs;
use crate::registry::JobRegistry;

const DISCOVERY_SYNC_IDLE_INTERVAL: Duration = Duration::from_secs(30 * 60);
const DISCOVERY_SYNC_ACTIVE_INTERVAL: Duration = Duration::from_secs(360 * 60);

/// Cheap, cloneable front door other subsystems hold on to so they can
/// toggle scheduler state without reaching into the running loop.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<Scheduler>,
}

impl SchedulerHandle {
    pub fn set_event_stream_active(&self, active: bool) {
        self.inner.event_stream_active.store(active, Ordering::SeqCst);
    }

    pub fn discovery_sync_interval(&self) -> Duration {
        self.inner.discovery_sync_interval()
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.inner.registry
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }
}

pub struct Scheduler {
    role: ProcessRole,
    timezone: Tz,
    registry: JobRegistry,
    running: AtomicBool,
    event_stream_active: AtomicBool,
}

impl Scheduler {
    pub fn new(role: ProcessRole) -> Arc<Self> {
        Self::with_timezone(role, "UTC")
    }

    /// `timezone` is the IANA name cron triggers evaluate against (e.g. from
    /// `OrchestratorConfig::scheduler_timezone`). Falls back to UTC for an
    /// unrecognized name rather than failing startup over it.
    pub fn with_timezone(role: ProcessRole, timezone: &str) -> Arc<Self> {
        let tz = Tz::from_str(timezone).unwrap_or_else(|_| {
            warn!(timezone, "unrecognized scheduler timezone, falling back to UTC");
            Tz::UTC
        });
        Arc::new(Self {
            role,
            timezone: tz,
            registry: JobRegistry::new(),
            running: AtomicBool::new(false),
            event_stream_active: AtomicBool::new(false),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn handle(self: &Arc<Self>) -> SchedulerHandle {
        SchedulerHandle { inner: Arc::clone(self) }
    }

    fn discovery_sync_interval(&self) -> Duration {
        if self.event_stream_active.load(Ordering::SeqCst) {
            DISCOVERY_SYNC_ACTIVE_INTERVAL
        } else {
            DISCOVERY_SYNC_IDLE_INTERVAL
        }
    }

    /// Registers the built-in jobs. A no-op when `role == api`: API pods in
    /// a multi-replica deployment must never own the clock.
    pub fn start(self: &Arc<Self>) {
        if !self.role.may_run_scheduler() {
            info!(role = ?self.role, "scheduler start is a no-op for this process role");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        for job in built_in_jobs(self.discovery_sync_interval()) {
            self.registry.add(job.id, match &job.trigger {
                crate::jobs::JobTrigger::Cron(expr) => expr.clone(),
                crate::jobs::JobTrigger::Interval(d) => format!("every {}s", d.as_secs()),
            });
        }
        info!("scheduler started");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!("scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_role_start_is_a_no_op() {
        let scheduler = Scheduler::new(ProcessRole::Api);
        scheduler.start();
        assert!(!scheduler.is_running());
        assert!(scheduler.registry.get("discovery_sync").is_none());
    }

    #[test]
    fn all_role_start_registers_built_in_jobs() {
        let scheduler = Scheduler::new(ProcessRole::All);
        scheduler.start();
        assert!(scheduler.is_running());
        assert!(scheduler.registry.get("discovery_sync").is_some());
        assert!(scheduler.registry.get("trace_evaluation").is_some());
        assert!(scheduler.registry.get("data_retention").is_some());
    }

    #[test]
    fn stop_clears_running_flag() {
        let scheduler = Scheduler::new(ProcessRole::Scheduler);
        scheduler.start();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn handle_toggles_discovery_interval() {
        let scheduler = Scheduler::new(ProcessRole::All);
        let handle = scheduler.handle();
        assert_eq!(handle.discovery_sync_interval(), DISCOVERY_SYNC_IDLE_INTERVAL);
        handle.set_event_stream_active(true);
        assert_eq!(handle.discovery_sync_interval(), DISCOVERY_SYNC_ACTIVE_INTERVAL);
        handle.set_event_stream_active(false);
        assert_eq!(handle.discovery_sync_interval(), DISCOVERY_SYNC_IDLE_INTERVAL);
    }

    #[test]
    fn unrecognized_timezone_falls_back_to_utc() {
        let scheduler = Scheduler::with_timezone(ProcessRole::All, "Not/A_Zone");
        assert_eq!(scheduler.timezone(), Tz::UTC);
    }

    #[test]
    fn recognized_timezone_is_honored() {
        let scheduler = Scheduler::with_timezone(ProcessRole::All, "America/New_York");
        assert_eq!(scheduler.timezone(), Tz::America__New_York);
    }

    #[test]
    fn starting_twice_is_idempotent() {
        let scheduler = Scheduler::new(ProcessRole::All);
        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());
    }
}
