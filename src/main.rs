// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::collections::HashSet;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use aether_agents::ExplicitAgent;
use aether_config::{ChatSettings, DashboardSettings, DataScienceSettings, MergedSettings, NotificationsSettings, OrchestratorConfig};
use aether_core::{Agent, AgentEvent, ChatRequest};
use aether_integrations::gateway::test_support::RecordingGateway;
use aether_memory::InMemoryStore;
use aether_tools::{
    DiscoverEntitiesTool, GetEntityStateTool, SearchEntitiesTool, SeekApprovalTool, ToolRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let orchestrator_config = OrchestratorConfig::from_env();
    orchestrator_config.validate()?;
    tracing::info!(
        deployment_mode = ?orchestrator_config.deployment_mode,
        role = ?orchestrator_config.role,
        "starting orchestration core",
    );

    let model = Arc::new(aether_model::openai_from_env(cli.model.clone()));

    let mut registry = ToolRegistry::new();
    registry.register(GetEntityStateTool);
    registry.register(DiscoverEntitiesTool);
    registry.register(SearchEntitiesTool);
    registry.register(SeekApprovalTool);

    let repositories: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let gateway = Arc::new(RecordingGateway::default());

    let agent = Agent::new(model, Arc::new(registry), repositories, gateway, default_settings());

    let span = tracing::info_span!("chat_request", conversation_id = tracing::field::Empty);
    let _enter = span.enter();

    let req = ChatRequest {
        user_message: cli.message,
        explicit_agent: ExplicitAgent::Named(aether_agents::AgentName::Architect),
        preset_agent: None,
        disabled_agents: HashSet::new(),
        model_name: cli.model,
        temperature: cli.temperature,
    };

    let (tx, mut rx) = tokio::sync::mpsc::channel(64);
    let run = tokio::spawn(async move { agent.run(req, tx).await });

    while let Some(event) = rx.recv().await {
        print_event(&event);
    }
    run.await??;
    Ok(())
}

fn default_settings() -> MergedSettings {
    MergedSettings {
        chat: ChatSettings::default(),
        dashboard: DashboardSettings::default(),
        data_science: DataScienceSettings::default(),
        notifications: NotificationsSettings::default(),
    }
}

fn print_event(event: &AgentEvent) {
    match event {
        AgentEvent::Token { delta } => print!("{delta}"),
        AgentEvent::Thinking { .. } => {}
        AgentEvent::ToolCall { call, .. } => eprintln!("\n[tool call] {} {:?}", call.name, call.args),
        AgentEvent::ToolResult { output, is_error, .. } => {
            eprintln!("[tool result{}] {output}", if *is_error { " error" } else { "" })
        }
        AgentEvent::Error { message } => eprintln!("\n[error] {message}"),
        AgentEvent::Done => println!(),
        _ => {}
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
