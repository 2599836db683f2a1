// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Process-wide configuration sourced from the environment.
//!
//! Unlike [`crate::settings`], this is read exactly once at startup and held
//! immutable for the process lifetime — there is no cache to invalidate
//! because there is nothing to write back.

use std::env;

/// `DEPLOYMENT_MODE` — selects whether the orchestrator drives agents
/// in-process or delegates to a remote architect service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    #[default]
    Monolith,
    Distributed,
}

impl DeploymentMode {
    fn from_env_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "distributed" => Self::Distributed,
            _ => Self::Monolith,
        }
    }
}

/// `AETHER_ROLE` — gates which process owns the scheduler clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessRole {
    #[default]
    All,
    Api,
    Scheduler,
}

impl ProcessRole {
    fn from_env_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Self::Api,
            "scheduler" => Self::Scheduler,
            _ => Self::All,
        }
    }

    /// Whether a process in this role is allowed to run the scheduler clock.
    pub fn may_run_scheduler(self) -> bool {
        !matches!(self, Self::Api)
    }
}

/// Process-wide configuration read once from the environment.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub deployment_mode: DeploymentMode,
    pub role: ProcessRole,
    pub webhook_secret: Option<String>,
    /// When true, an unset `webhook_secret` is a hard startup error rather
    /// than a silently-unauthenticated webhook endpoint.
    pub production_mode: bool,
    pub scheduler_timezone: String,
    pub distributed_architect_url: Option<String>,
}

impl OrchestratorConfig {
    /// Build from the process environment. Never panics; absent variables
    /// fall back to documented defaults.
    pub fn from_env() -> Self {
        let deployment_mode = env::var("DEPLOYMENT_MODE")
            .map(|v| DeploymentMode::from_env_str(&v))
            .unwrap_or_default();
        let role = env::var("AETHER_ROLE")
            .map(|v| ProcessRole::from_env_str(&v))
            .unwrap_or_default();
        let webhook_secret = env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty());
        let production_mode = env::var("PRODUCTION_MODE")
            .map(|v| v.trim().eq_ignore_ascii_case("true") || v.trim() == "1")
            .unwrap_or(false);
        let scheduler_timezone =
            env::var("SCHEDULER_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let distributed_architect_url = env::var("DISTRIBUTED_ARCHITECT_URL").ok();

        Self {
            deployment_mode,
            role,
            webhook_secret,
            production_mode,
            scheduler_timezone,
            distributed_architect_url,
        }
    }

    /// Validate startup invariants. In production mode a webhook endpoint
    /// with no configured secret is a configuration error, not a silent
    /// open endpoint.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.production_mode && self.webhook_secret.is_none() {
            anyhow::bail!(
                "PRODUCTION_MODE is set but WEBHOOK_SECRET is unset; refusing to start \
                 with an unauthenticated webhook endpoint"
            );
        }
        Ok(())
    }
}
