// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The event taxonomy streamed out of a single orchestrator turn. Every
//! event is tagged so the SSE transport can carry them over one wire
//! format without a parallel enum on the client side.

use aether_agents::{AgentName, ClarificationOption};
use aether_tools::ToolCall;
use serde::Serialize;
use uuid::Uuid;

/// One event in an orchestrator turn's output stream.
///
/// A successful stream always ends `metadata` then [`AgentEvent::Done`].
/// Background requests (see `is_background_request`) suppress `Trace`,
/// `AgentStart`, `AgentEnd`, `Status`, `Delegation`, and `ProposalCreated`
/// — only `Token`, `Thinking`, `Metadata`, and `Done` still flow.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Incremental visible text delta.
    Token { delta: String },
    /// Content extracted from a model reasoning tag. Never concatenated
    /// with `Token` deltas.
    Thinking { delta: String },
    /// A tool call the model requested, attributed to the agent whose
    /// tool-calling loop issued it.
    ToolCall { agent: AgentName, call: ToolCall },
    /// The result of a previously-started tool call.
    ToolResult {
        agent: AgentName,
        call_id: String,
        output: String,
        is_error: bool,
    },
    /// Delegation bracket: an agent other than the architect was pushed
    /// onto the agent stack.
    AgentStart { agent: AgentName },
    /// Delegation bracket: an agent was popped off the agent stack.
    AgentEnd { agent: AgentName },
    /// Explicit cross-agent handoff, distinct from the start/end
    /// brackets emitted automatically by tool→agent attribution.
    Delegation { from: AgentName, to: AgentName, content: String },
    /// Transient human-readable status string. An empty string clears
    /// whatever status is currently displayed.
    Status { message: String },
    /// Classification result for an `auto` request.
    Routing { target_agent: AgentName, confidence: f32, reasoning: String },
    /// User-facing choices offered when routing was ambiguous.
    ClarificationOptions { options: Vec<ClarificationOption> },
    /// Emitted when a mutating tool's approval-seeking call succeeds and
    /// a Proposal has been persisted in `Proposed` status.
    ProposalCreated { proposal_id: Uuid },
    /// Emitted when the agent pauses for human-in-the-loop approval
    /// instead of executing a mutating tool directly.
    ApprovalRequired { proposal_id: Uuid, summary: String },
    /// Lifecycle event for the activity panel.
    Trace(TraceEvent),
    /// Trailing carriers: conversation id, trace id, job id, and the
    /// deduplicated list of tool calls observed during the turn.
    Metadata {
        conversation_id: Uuid,
        trace_id: Uuid,
        job_id: Option<Uuid>,
        tool_calls: Vec<String>,
    },
    /// Generic terminal failure. Internal detail is never included —
    /// see `aether_integrations::sanitize_external_error` for the same
    /// redaction policy applied to outbound-RPC failures.
    Error { message: String },
    /// Literal stream terminator. No event follows this one.
    Done,
}

/// One entry in the activity-panel trace. `agent` is `None` for the
/// terminal `Complete` event, which instead carries every agent the
/// turn touched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TraceEvent {
    pub kind: TraceKind,
    pub agent: Option<AgentName>,
    pub tool: Option<String>,
    pub agents: Vec<AgentName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Start,
    End,
    ToolCall,
    ToolResult,
    Complete,
}

impl TraceEvent {
    pub fn start(agent: AgentName) -> Self {
        Self { kind: TraceKind::Start, agent: Some(agent), tool: None, agents: Vec::new() }
    }

    pub fn end(agent: AgentName) -> Self {
        Self { kind: TraceKind::End, agent: Some(agent), tool: None, agents: Vec::new() }
    }

    pub fn tool_call(agent: AgentName, tool: impl Into<String>) -> Self {
        Self {
            kind: TraceKind::ToolCall,
            agent: Some(agent),
            tool: Some(tool.into()),
            agents: Vec::new(),
        }
    }

    pub fn tool_result(agent: AgentName, tool: impl Into<String>) -> Self {
        Self {
            kind: TraceKind::ToolResult,
            agent: Some(agent),
            tool: Some(tool.into()),
            agents: Vec::new(),
        }
    }

    /// The final trace event of a turn, carrying the deduplicated set of
    /// every agent observed, in first-seen order.
    pub fn complete(agents: Vec<AgentName>) -> Self {
        Self { kind: TraceKind::Complete, agent: None, tool: None, agents }
    }
}
