// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The streaming orchestrator: one [`Agent::run`] call per turn, driving
//! the model ↔ tool loop and emitting the [`AgentEvent`] stream.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use aether_agents::{
    agent_for_tool, fallback_if_unregistered, AgentName, Classifier, ExplicitAgent, Planner,
    PlannerDecision,
};
use aether_config::{DeploymentMode, MergedSettings};
use aether_integrations::HomeAssistantGateway;
use aether_memory::{derive_conversation_id, is_background_request, RepositoryFactory};
use aether_model::{
    CompletionRequest, FunctionCall, Message, MessageContent, ModelProvider, ResponseEvent, Role,
    ToolSchema as ModelToolSchema,
};
use aether_tools::builtin::approval::synthesize_proposal;
use aether_tools::{ExecutionContext, ModelContext, ToolCall, ToolOutput, ToolRegistry};

use crate::distributed::{try_distributed, DistributedOutcome, RemoteArchitect};
use crate::events::{AgentEvent, TraceEvent};
use crate::runtime_context;
use crate::session::Session;
use crate::thinking_filter::{FilteredDelta, ThinkingFilter};

/// One turn's input: the user's message plus the routing inputs
/// `resolve()` needs (§4.2).
pub struct ChatRequest {
    pub user_message: String,
    pub explicit_agent: ExplicitAgent,
    pub preset_agent: Option<AgentName>,
    pub disabled_agents: HashSet<AgentName>,
    pub model_name: String,
    pub temperature: f32,
}

/// Drives one turn end to end: routing, the orchestrator pass when
/// needed, the tool-calling loop, and the HITL approval gate for
/// mutating tools.
pub struct Agent {
    model: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    repositories: Arc<dyn RepositoryFactory>,
    gateway: Arc<dyn HomeAssistantGateway>,
    settings: MergedSettings,
    classifier: Option<Arc<dyn Classifier>>,
    planner: Option<Arc<dyn Planner>>,
    deployment_mode: DeploymentMode,
    remote: Option<Arc<dyn RemoteArchitect>>,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        repositories: Arc<dyn RepositoryFactory>,
        gateway: Arc<dyn HomeAssistantGateway>,
        settings: MergedSettings,
    ) -> Self {
        Self {
            model,
            tools,
            repositories,
            gateway,
            settings,
            classifier: None,
            planner: None,
            deployment_mode: DeploymentMode::Monolith,
            remote: None,
        }
    }

    /// Attach the classifier/planner pair used for `auto`-routed requests.
    /// Without this, a request that needs orchestration is simply run on
    /// the architect.
    pub fn with_orchestrator(
        mut self,
        classifier: Arc<dyn Classifier>,
        planner: Arc<dyn Planner>,
    ) -> Self {
        self.classifier = Some(classifier);
        self.planner = Some(planner);
        self
    }

    /// Enable the distributed deployment path (§4.1 EXPANSION). With
    /// `mode == Distributed`, every turn first tries `remote`, falling back
    /// to the in-process path only on a pre-first-byte failure.
    pub fn with_distributed(mut self, mode: DeploymentMode, remote: Arc<dyn RemoteArchitect>) -> Self {
        self.deployment_mode = mode;
        self.remote = Some(remote);
        self
    }

    /// Run one turn, streaming events through `tx`. Sends are best-effort —
    /// a dropped receiver (caller gave up on the stream) does not abort
    /// the turn, since mutating tool calls must still be seen through to
    /// a proposal rather than left half-executed.
    pub async fn run(&self, req: ChatRequest, tx: mpsc::Sender<AgentEvent>) -> anyhow::Result<()> {
        self.run_cancellable(req, tx, CancellationToken::new()).await
    }

    /// Like [`Agent::run`], but `token` lets the caller cancel the turn.
    /// In-flight tool invocations are cancelled at their first suspension
    /// point; partial results are discarded and no trace/metadata summary
    /// is sent for the turn (§4.1 "Cancellation").
    pub async fn run_cancellable(
        &self,
        req: ChatRequest,
        tx: mpsc::Sender<AgentEvent>,
        token: CancellationToken,
    ) -> anyhow::Result<()> {
        if self.deployment_mode == DeploymentMode::Distributed {
            if let Some(remote) = &self.remote {
                match try_distributed(remote.as_ref(), &req, &tx).await {
                    DistributedOutcome::Completed => return Ok(()),
                    DistributedOutcome::Fallback => {}
                }
            }
        }

        let background = is_background_request(&req.user_message);
        let conversation_id = if background {
            Uuid::new_v4()
        } else {
            derive_conversation_id(&req.user_message)
        };
        let trace_parent_span = Uuid::new_v4();

        let routing = aether_agents::resolve(req.explicit_agent, req.preset_agent, req.disabled_agents);
        let mut active_agent = routing.active_agent;
        let mut agents_seen: Vec<AgentName> = vec![active_agent];

        if routing.needs_orchestrator {
            match self.run_orchestrator_pass(&req.user_message, background, &tx).await {
                OrchestratorOutcome::Proceed(agent) => {
                    active_agent = agent;
                    agents_seen = vec![active_agent];
                }
                OrchestratorOutcome::ClarifyOrStop => {
                    let _ = tx.send(AgentEvent::Done).await;
                    return Ok(());
                }
                OrchestratorOutcome::NoOrchestratorConfigured => {
                    // Fall through on the architect, same as an explicit route.
                }
            }
        }

        if !background && active_agent != AgentName::Architect {
            let _ = tx.send(AgentEvent::AgentStart { agent: active_agent }).await;
            let _ = tx.send(AgentEvent::Trace(TraceEvent::start(active_agent))).await;
        }

        let model_context = ModelContext { model: req.model_name.clone(), temperature: req.temperature };
        let ctx = ExecutionContext::new(
            conversation_id,
            trace_parent_span,
            model_context,
            Arc::clone(&self.repositories),
            Arc::clone(&self.gateway),
        );

        let mut session = Session::new(self.model.catalog_context_window().unwrap_or(8192) as usize);
        session.push(Message::system(crate::prompts::system_prompt(active_agent, &self.tools.names())));
        session.push(Message::user(req.user_message.as_str()));

        let mut tool_calls_seen: Vec<String> = Vec::new();
        let result = runtime_context::scope(
            ctx,
            self.run_tool_loop(
                &mut session,
                active_agent,
                background,
                &tx,
                &mut tool_calls_seen,
                &mut agents_seen,
                &token,
            ),
        )
        .await;

        if !background && active_agent != AgentName::Architect {
            let _ = tx.send(AgentEvent::Trace(TraceEvent::end(active_agent))).await;
            let _ = tx.send(AgentEvent::AgentEnd { agent: active_agent }).await;
        }

        if token.is_cancelled() {
            // Partial results discarded: no trace-complete/metadata summary
            // for a cancelled turn, just the terminal marker.
            let _ = tx.send(AgentEvent::Done).await;
            return Ok(());
        }

        if let Err(e) = result {
            let _ = tx.send(AgentEvent::Error { message: e.to_string() }).await;
            let _ = tx.send(AgentEvent::Done).await;
            return Ok(());
        }

        if !background {
            let _ = tx.send(AgentEvent::Trace(TraceEvent::complete(dedup(agents_seen)))).await;
        }
        let _ = tx
            .send(AgentEvent::Metadata {
                conversation_id,
                trace_id: trace_parent_span,
                job_id: None,
                tool_calls: tool_calls_seen,
            })
            .await;
        let _ = tx.send(AgentEvent::Done).await;
        Ok(())
    }

    /// Classifier → planner pass for a request routed to `auto` (§4.2).
    /// Emits `routing` and, on ambiguity, `clarification_options`.
    async fn run_orchestrator_pass(
        &self,
        user_message: &str,
        background: bool,
        tx: &mpsc::Sender<AgentEvent>,
    ) -> OrchestratorOutcome {
        let (Some(classifier), Some(planner)) = (&self.classifier, &self.planner) else {
            return OrchestratorOutcome::NoOrchestratorConfigured;
        };

        let classification = match classifier.classify(user_message).await {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(AgentEvent::Error { message: format!("classification failed: {e}") }).await;
                return OrchestratorOutcome::ClarifyOrStop;
            }
        };

        if !background {
            let _ = tx
                .send(AgentEvent::Routing {
                    target_agent: classification.target_agent,
                    confidence: classification.confidence as f32,
                    reasoning: classification.reasoning.clone(),
                })
                .await;
        }

        match planner.plan(&classification).await {
            Ok(PlannerDecision::Proceed { target_agent }) => {
                let agent = fallback_if_unregistered(target_agent, &[AgentName::Architect]);
                OrchestratorOutcome::Proceed(agent)
            }
            Ok(PlannerDecision::Clarify { clarification_options }) => {
                if !background {
                    let _ = tx
                        .send(AgentEvent::ClarificationOptions { options: clarification_options })
                        .await;
                }
                OrchestratorOutcome::ClarifyOrStop
            }
            Err(e) => {
                let _ = tx.send(AgentEvent::Error { message: format!("planning failed: {e}") }).await;
                OrchestratorOutcome::ClarifyOrStop
            }
        }
    }

    /// The model ↔ tool loop: stream a turn, dispatch any tool calls it
    /// produced, repeat until the model stops calling tools or the
    /// configured iteration budget (§4.1/§4.3) is spent.
    async fn run_tool_loop(
        &self,
        session: &mut Session,
        mut active_agent: AgentName,
        background: bool,
        tx: &mpsc::Sender<AgentEvent>,
        tool_calls_seen: &mut Vec<String>,
        agents_seen: &mut Vec<AgentName>,
        token: &CancellationToken,
    ) -> anyhow::Result<()> {
        let max_iterations = self.settings.chat.max_tool_iterations.max(1) as u32;
        let mut iterations = 0u32;

        loop {
            if token.is_cancelled() {
                break;
            }
            iterations += 1;
            if iterations > max_iterations {
                let _ = tx
                    .send(AgentEvent::Error { message: "maximum tool iterations reached".into() })
                    .await;
                break;
            }

            let (text, tool_calls) = self.stream_one_turn(session, tx, token).await?;
            if token.is_cancelled() {
                break;
            }
            if !text.is_empty() {
                session.push(Message::assistant(text));
            }
            if tool_calls.is_empty() {
                break;
            }

            for tc in &tool_calls {
                session.push(Message {
                    role: Role::Assistant,
                    content: MessageContent::ToolCall {
                        tool_call_id: tc.id.clone(),
                        function: FunctionCall { name: tc.name.clone(), arguments: tc.args.to_string() },
                    },
                });
            }

            for tc in &tool_calls {
                let owner = agent_for_tool(&tc.name);
                if owner != active_agent {
                    if !background {
                        let _ = tx
                            .send(AgentEvent::Delegation { from: active_agent, to: owner, content: tc.name.clone() })
                            .await;
                        let _ = tx.send(AgentEvent::AgentStart { agent: owner }).await;
                        let _ = tx.send(AgentEvent::Trace(TraceEvent::start(owner))).await;
                    }
                    active_agent = owner;
                    agents_seen.push(owner);
                }

                tool_calls_seen.push(tc.name.clone());
                if !background {
                    let _ = tx.send(AgentEvent::ToolCall { agent: active_agent, call: tc.clone() }).await;
                    let _ = tx.send(AgentEvent::Trace(TraceEvent::tool_call(active_agent, &tc.name))).await;
                }

                let output = self.execute_tool(tc, tx, background, token).await;

                if !background {
                    let _ = tx
                        .send(AgentEvent::ToolResult {
                            agent: active_agent,
                            call_id: tc.id.clone(),
                            output: output.content.clone(),
                            is_error: output.is_error,
                        })
                        .await;
                    let _ = tx.send(AgentEvent::Trace(TraceEvent::tool_result(active_agent, &tc.name))).await;
                }

                session.push(Message::tool_result(&tc.id, &output.content));
            }
        }

        Ok(())
    }

    /// Dispatch a single tool call. Mutating tools never reach
    /// `ToolRegistry::execute` — they're turned into a Proposal here
    /// instead (§4.3, §4.6).
    async fn execute_tool(
        &self,
        tc: &ToolCall,
        tx: &mpsc::Sender<AgentEvent>,
        background: bool,
        token: &CancellationToken,
    ) -> ToolOutput {
        let ctx = runtime_context::current();
        let is_mutating = self.tools.get(&tc.name).map(|t| t.is_mutating()).unwrap_or(false);

        if is_mutating {
            return match synthesize_proposal(&ctx, tc).await {
                Ok(proposal) => {
                    if !background {
                        let _ = tx.send(AgentEvent::ProposalCreated { proposal_id: proposal.id }).await;
                        let _ = tx
                            .send(AgentEvent::ApprovalRequired {
                                proposal_id: proposal.id,
                                summary: format!("{:?} proposal pending approval", proposal.kind),
                            })
                            .await;
                    }
                    ToolOutput::ok(&tc.id, format!("proposal {} created, awaiting approval", proposal.id))
                }
                Err(e) => ToolOutput::err(&tc.id, e.to_string()),
            };
        }

        let timeout_secs = if tc.name == "consult_data_science_team" {
            self.settings.chat.analysis_tool_timeout_seconds
        } else {
            self.settings.chat.tool_timeout_seconds
        };
        let timeout = Duration::from_secs(timeout_secs.max(1) as u64);

        let registry = Arc::clone(&self.tools);
        let tc_owned = tc.clone();
        tokio::select! {
            _ = token.cancelled() => ToolOutput::err(&tc.id, "cancelled".to_string()),
            result = tokio::time::timeout(timeout, registry.execute(&ctx, &tc_owned)) => match result {
                Ok(output) => output,
                Err(_) => ToolOutput::err(&tc.id, format!("tool {} timed out", tc.name)),
            },
        }
    }

    /// Call the model once, streaming text/thinking deltas through `tx`
    /// and accumulating tool calls. Returns the visible text and the
    /// fully-assembled tool calls for this turn.
    async fn stream_one_turn(
        &self,
        session: &mut Session,
        tx: &mpsc::Sender<AgentEvent>,
        token: &CancellationToken,
    ) -> anyhow::Result<(String, Vec<ToolCall>)> {
        let tools: Vec<ModelToolSchema> = self
            .tools
            .schemas()
            .into_iter()
            .map(|s| ModelToolSchema { name: s.name, description: s.description, parameters: s.parameters })
            .collect();

        let req = CompletionRequest { messages: session.messages.clone(), tools, stream: true };

        let mut stream = self.model.complete(req).await?;
        let mut full_text = String::new();
        let mut filter = ThinkingFilter::new();
        // Accumulated per logical tool call, in first-seen order. This type
        // carries no per-chunk index, so a continuation chunk (empty id) is
        // folded into whichever call was seen most recently.
        let mut order: Vec<String> = Vec::new();
        let mut by_id: std::collections::HashMap<String, (String, String)> = std::collections::HashMap::new();

        loop {
            let event = tokio::select! {
                _ = token.cancelled() => break,
                next = stream.next() => match next {
                    Some(e) => e,
                    None => break,
                },
            };
            match event? {
                ResponseEvent::TextDelta(delta) => {
                    for piece in filter.push(&delta) {
                        emit_filtered(tx, piece, &mut full_text).await;
                    }
                }
                ResponseEvent::ThinkingDelta(delta) => {
                    let _ = tx.send(AgentEvent::Thinking { delta }).await;
                }
                ResponseEvent::ToolCall { id, name, arguments } => {
                    let key = if id.is_empty() {
                        order.last().cloned().unwrap_or_default()
                    } else {
                        id.clone()
                    };
                    if !by_id.contains_key(&key) {
                        order.push(key.clone());
                    }
                    let entry = by_id.entry(key).or_insert_with(|| (String::new(), String::new()));
                    if !name.is_empty() {
                        entry.0 = name;
                    }
                    entry.1.push_str(&arguments);
                }
                ResponseEvent::Usage { .. } => {}
                ResponseEvent::Error(message) => {
                    let _ = tx.send(AgentEvent::Error { message }).await;
                }
                ResponseEvent::Done => break,
            }
        }
        if let Some(piece) = filter.flush() {
            emit_filtered(tx, piece, &mut full_text).await;
        }

        let mut tool_calls = Vec::with_capacity(order.len());
        for id in order {
            let (name, args_buf) = by_id.remove(&id).unwrap_or_default();
            let args = serde_json::from_str(&args_buf).unwrap_or(serde_json::json!({}));
            tool_calls.push(ToolCall { id, name, args });
        }

        Ok((full_text, tool_calls))
    }
}

async fn emit_filtered(tx: &mpsc::Sender<AgentEvent>, piece: FilteredDelta, full_text: &mut String) {
    match piece {
        FilteredDelta::Token(s) => {
            full_text.push_str(&s);
            let _ = tx.send(AgentEvent::Token { delta: s }).await;
        }
        FilteredDelta::Thinking(s) => {
            let _ = tx.send(AgentEvent::Thinking { delta: s }).await;
        }
    }
}

enum OrchestratorOutcome {
    Proceed(AgentName),
    ClarifyOrStop,
    NoOrchestratorConfigured,
}

fn dedup(agents: Vec<AgentName>) -> Vec<AgentName> {
    let mut seen = HashSet::new();
    agents.into_iter().filter(|a| seen.insert(*a)).collect()
}
