// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Free-text search across entity ids and friendly names. Read-only.
/// Used by the `librarian` agent (§4.2's tool→agent attribution).
pub struct DiscoverEntitiesTool;

#[async_trait]
impl Tool for DiscoverEntitiesTool {
    fn name(&self) -> &str {
        "discover_entities"
    }

    fn description(&self) -> &str {
        "Search for entities matching a free-text query across ids and attributes."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" }
            },
            "required": ["query"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::MatchList
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        search_entities(ctx, call).await
    }
}

/// Same underlying query, exposed as a distinct tool name for direct
/// architect-loop lookups that don't need the `librarian` attribution.
pub struct SearchEntitiesTool;

#[async_trait]
impl Tool for SearchEntitiesTool {
    fn name(&self) -> &str {
        "search_entities"
    }

    fn description(&self) -> &str {
        "Search for entities matching a free-text query across ids and attributes."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" }
            },
            "required": ["query"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::MatchList
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        search_entities(ctx, call).await
    }
}

async fn search_entities(ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
    let Some(query) = call.args.get("query").and_then(Value::as_str) else {
        return ToolOutput::err(&call.id, "missing required argument: query");
    };

    match ctx.gateway.search_entities(query).await {
        Ok(states) => {
            let entries: Vec<Value> = states
                .into_iter()
                .map(|s| json!({ "entity_id": s.entity_id, "state": s.state }))
                .collect();
            ToolOutput::ok(&call.id, json!(entries).to_string())
        }
        Err(err) => ToolOutput::err(&call.id, aether_integrations::sanitize_external_error(&err)),
    }
}
