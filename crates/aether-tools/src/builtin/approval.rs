// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The one mutating tool every other actuation funnels through. The
//! dispatch loop (§4.3) intercepts any `is_mutating() == true` tool call
//! *before* reaching [`Tool::execute`] and calls [`synthesize_proposal`]
//! directly instead — `SeekApprovalTool::execute` itself is unreachable
//! in normal operation, same as any other mutating tool, and exists only
//! so the tool still has a schema the model can call and a registry
//! entry consistent with every other tool.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use aether_memory::{Proposal, ProposalKind, RepositoryError};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

#[derive(Debug, Error)]
pub enum ProposalSynthesisError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("unknown proposal kind: {0}")]
    UnknownKind(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Transition(#[from] aether_memory::ProposalError),
}

fn parse_kind(raw: &str) -> Result<ProposalKind, ProposalSynthesisError> {
    match raw {
        "automation" => Ok(ProposalKind::Automation),
        "entity_command" => Ok(ProposalKind::EntityCommand),
        "script" => Ok(ProposalKind::Script),
        "scene" => Ok(ProposalKind::Scene),
        other => Err(ProposalSynthesisError::UnknownKind(other.to_string())),
    }
}

/// Builds a `Proposal` from a `seek_approval` call's arguments, transitions
/// it Draft → Proposed, and persists it. Returns the stored proposal so
/// the caller can emit `proposal_created`/`approval_required` with its id.
pub async fn synthesize_proposal(
    ctx: &ExecutionContext,
    call: &ToolCall,
) -> Result<Proposal, ProposalSynthesisError> {
    let kind_raw = call
        .args
        .get("kind")
        .and_then(Value::as_str)
        .ok_or(ProposalSynthesisError::MissingArgument("kind"))?;
    let kind = parse_kind(kind_raw)?;
    let body = call
        .args
        .get("body")
        .cloned()
        .ok_or(ProposalSynthesisError::MissingArgument("body"))?;

    let mut proposal = Proposal::draft(kind, body, Some(ctx.conversation_id));
    proposal.propose()?;
    Ok(ctx.repositories.proposals().create(proposal).await?)
}

pub struct SeekApprovalTool;

#[async_trait]
impl Tool for SeekApprovalTool {
    fn name(&self) -> &str {
        "seek_approval"
    }

    fn description(&self) -> &str {
        "Propose a home-automation change (automation, entity command, script, or scene) for human approval. Never executes the change directly."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "kind": {
                    "type": "string",
                    "enum": ["automation", "entity_command", "script", "scene"]
                },
                "body": {
                    "type": "object",
                    "description": "The proposed change, shaped per kind"
                }
            },
            "required": ["kind", "body"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Ask
    }

    fn is_mutating(&self) -> bool {
        true
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::Generic
    }

    async fn execute(&self, _ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        ToolOutput::err(&call.id, "seek_approval must be routed through the approval gate")
    }
}
