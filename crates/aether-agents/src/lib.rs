// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Agent registry, intent routing, and tool-to-agent attribution.
//!
//! The router never runs a model itself — [`Classifier`] and [`Planner`] are
//! traits so the orchestrator can plug in whatever language-model-backed
//! implementation it likes (or a deterministic one in tests). This crate
//! only owns the decision tables: which agent a request should land on, and
//! which agent a tool call should be attributed to in the activity feed.

mod registry;
mod routing;

pub use registry::{Agent, AgentName, AGENTS};
pub use routing::{
    agent_for_tool, fallback_if_unregistered, resolve, ClarificationOption, Classification,
    Classifier, ExplicitAgent, Planner, PlannerDecision, Routing,
};
