// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! End-to-end orchestrator scenarios, exercised through [`crate::Agent::run`]
//! rather than its private helpers (see `agent.rs`'s own `#[cfg(test)]`
//! module for unit-level coverage of the tool-call loop, the HITL gate,
//! background suppression, and the thinking-tag filter).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use aether_agents::{
    AgentName, Classification, Classifier, ClarificationOption, ExplicitAgent, Planner,
    PlannerDecision,
};
use aether_config::{ChatSettings, DashboardSettings, DataScienceSettings, MergedSettings, NotificationsSettings};
use aether_integrations::gateway::test_support::RecordingGateway;
use aether_memory::InMemoryStore;
use aether_model::ScriptedMockProvider;
use aether_tools::{GetEntityStateTool, SeekApprovalTool, ToolRegistry};

use crate::{Agent, AgentEvent, ChatRequest};

fn settings_with_max_iterations(max: i64) -> MergedSettings {
    MergedSettings {
        chat: ChatSettings { max_tool_iterations: max, ..ChatSettings::default() },
        dashboard: DashboardSettings::default(),
        data_science: DataScienceSettings::default(),
        notifications: NotificationsSettings::default(),
    }
}

fn agent_with_settings(model: ScriptedMockProvider, settings: MergedSettings) -> Agent {
    let mut reg = ToolRegistry::new();
    reg.register(GetEntityStateTool);
    reg.register(SeekApprovalTool);
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    Agent::new(
        Arc::new(model),
        Arc::new(reg),
        Arc::new(store),
        Arc::new(RecordingGateway::default()),
        settings,
    )
}

fn chat(message: &str, explicit: ExplicitAgent) -> ChatRequest {
    ChatRequest {
        user_message: message.to_string(),
        explicit_agent: explicit,
        preset_agent: None,
        disabled_agents: HashSet::new(),
        model_name: "test-model".to_string(),
        temperature: 0.2,
    }
}

async fn drain(mut rx: mpsc::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    while let Some(e) = rx.recv().await {
        events.push(e);
    }
    events
}

struct FixedClassifier(AgentName);

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _first_user_message: &str) -> anyhow::Result<Classification> {
        Ok(Classification { target_agent: self.0, confidence: 0.9, reasoning: "fixed for test".into() })
    }
}

struct ProceedPlanner;

#[async_trait]
impl Planner for ProceedPlanner {
    async fn plan(&self, classification: &Classification) -> anyhow::Result<PlannerDecision> {
        Ok(PlannerDecision::Proceed { target_agent: classification.target_agent })
    }
}

struct ClarifyPlanner;

#[async_trait]
impl Planner for ClarifyPlanner {
    async fn plan(&self, _classification: &Classification) -> anyhow::Result<PlannerDecision> {
        Ok(PlannerDecision::Clarify {
            clarification_options: vec![ClarificationOption {
                title: "Kitchen or hallway?".into(),
                description: "Which light did you mean?".into(),
            }],
        })
    }
}

#[tokio::test]
async fn auto_routing_runs_classifier_then_planner_then_the_resolved_agent() {
    let model = ScriptedMockProvider::always_text("diagnosis complete");
    let agent = agent_with_settings(model, settings_with_max_iterations(10))
        .with_orchestrator(Arc::new(FixedClassifier(AgentName::DataScienceTeam)), Arc::new(ProceedPlanner));
    let (tx, rx) = mpsc::channel(32);
    agent.run(chat("why is the fridge using so much power?", ExplicitAgent::Auto), tx).await.unwrap();
    let events = drain(rx).await;

    assert!(events.iter().any(|e| matches!(
        e,
        AgentEvent::Routing { target_agent: AgentName::DataScienceTeam, .. }
    )));
    // `consult_data_science_team` isn't registered on this agent's tool
    // registry, so fallback_if_unregistered downgrades it to the architect —
    // but the routing event above still carries the original classification.
    assert!(matches!(events.last().unwrap(), AgentEvent::Done));
}

#[tokio::test]
async fn ambiguous_routing_emits_clarification_options_and_stops() {
    let model = ScriptedMockProvider::always_text("should never run");
    let agent = agent_with_settings(model, settings_with_max_iterations(10))
        .with_orchestrator(Arc::new(FixedClassifier(AgentName::Architect)), Arc::new(ClarifyPlanner));
    let (tx, rx) = mpsc::channel(32);
    agent.run(chat("turn off the light", ExplicitAgent::Auto), tx).await.unwrap();
    let events = drain(rx).await;

    assert!(events
        .iter()
        .any(|e| matches!(e, AgentEvent::ClarificationOptions { options } if options.len() == 1)));
    assert!(!events.iter().any(|e| matches!(e, AgentEvent::Token { .. })));
    assert_eq!(events.len(), 2); // ClarificationOptions then Done — the model never ran.
}

#[tokio::test]
async fn explicit_agent_request_skips_the_orchestrator_pass() {
    let model = ScriptedMockProvider::always_text("the kitchen light is on");
    let agent = agent_with_settings(model, settings_with_max_iterations(10))
        .with_orchestrator(Arc::new(FixedClassifier(AgentName::Librarian)), Arc::new(ProceedPlanner));
    let (tx, rx) = mpsc::channel(32);
    agent.run(chat("is the kitchen light on?", ExplicitAgent::Named(AgentName::Architect)), tx).await.unwrap();
    let events = drain(rx).await;

    assert!(!events.iter().any(|e| matches!(e, AgentEvent::Routing { .. })));
}

#[tokio::test]
async fn exhausting_the_tool_iteration_budget_surfaces_an_error() {
    // Every scripted round returns the same tool call and never a final
    // text-only turn, so the loop can only stop via the iteration cap.
    let mut scripts = Vec::new();
    for _ in 0..3 {
        scripts.push(vec![
            aether_model::ResponseEvent::ToolCall {
                id: "call-1".into(),
                name: "get_entity_state".into(),
                arguments: "{\"entity_id\": \"light.kitchen\"}".into(),
            },
            aether_model::ResponseEvent::Done,
        ]);
    }
    let model = ScriptedMockProvider::new(scripts);
    let agent = agent_with_settings(model, settings_with_max_iterations(2));
    let (tx, rx) = mpsc::channel(32);
    agent.run(chat("keep checking the light", ExplicitAgent::Named(AgentName::Architect)), tx).await.unwrap();
    let events = drain(rx).await;

    assert!(events
        .iter()
        .any(|e| matches!(e, AgentEvent::Error { message } if message.contains("maximum tool iterations"))));
}
