// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Intent resolution: explicit-agent / preset / disabled-set into a
//! [`Routing`] decision, plus the orchestrator-pass classifier/planner
//! seam and the static tool→agent attribution table.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::registry::AgentName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    pub active_agent: AgentName,
    pub needs_orchestrator: bool,
    pub disabled_agents: HashSet<AgentName>,
}

/// `auto` is spelled out explicitly rather than folded into `Option<AgentName>`
/// because it is a distinct instruction ("let the orchestrator decide"), not
/// the absence of one.
pub enum ExplicitAgent {
    Auto,
    Named(AgentName),
}

/// Compute the routing decision for a request.
///
/// Presets win over the disabled-set when they conflict: a preset that
/// names an agent also in `disabled_agents` still activates it. The
/// disabled-set is advisory outside of that override.
pub fn resolve(
    explicit: ExplicitAgent,
    preset_agent: Option<AgentName>,
    disabled_agents: HashSet<AgentName>,
) -> Routing {
    if let Some(agent) = preset_agent {
        return Routing { active_agent: agent, needs_orchestrator: false, disabled_agents };
    }

    match explicit {
        ExplicitAgent::Named(agent) if !disabled_agents.contains(&agent) => {
            Routing { active_agent: agent, needs_orchestrator: false, disabled_agents }
        }
        ExplicitAgent::Named(_) | ExplicitAgent::Auto => {
            Routing { active_agent: AgentName::Architect, needs_orchestrator: true, disabled_agents }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub target_agent: AgentName,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationOption {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "response_type", rename_all = "snake_case")]
pub enum PlannerDecision {
    Proceed { target_agent: AgentName },
    Clarify { clarification_options: Vec<ClarificationOption> },
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, first_user_message: &str) -> anyhow::Result<Classification>;
}

#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, classification: &Classification) -> anyhow::Result<PlannerDecision>;
}

/// Tool name to owning agent, used solely for trace attribution — the tool
/// still runs inside the architect's tool-calling loop regardless of what
/// this returns. Unmapped tools default to the architect.
pub fn agent_for_tool(tool_name: &str) -> AgentName {
    match tool_name {
        "consult_data_science_team" => AgentName::DataScienceTeam,
        "discover_entities" => AgentName::Librarian,
        "create_insight_schedule" | "seek_approval" => AgentName::System,
        _ => AgentName::Architect,
    }
}

/// If the routed agent has no streaming workflow registered for it, fall
/// back to the architect while keeping the `routing` event's original
/// attribution intact for the UI.
pub fn fallback_if_unregistered(active_agent: AgentName, registered: &[AgentName]) -> AgentName {
    if active_agent == AgentName::Architect || registered.contains(&active_agent) {
        active_agent
    } else {
        AgentName::Architect
    }
}
