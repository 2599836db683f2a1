// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Lists every entity in a domain (e.g. all `light.*` entities). Read-only.
pub struct ListEntitiesByDomainTool;

#[async_trait]
impl Tool for ListEntitiesByDomainTool {
    fn name(&self) -> &str {
        "list_entities_by_domain"
    }

    fn description(&self) -> &str {
        "List every entity belonging to a domain, e.g. 'light' or 'climate'."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": { "type": "string", "description": "e.g. light, climate, switch" }
            },
            "required": ["domain"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::MatchList
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        let Some(domain) = call.args.get("domain").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing required argument: domain");
        };

        match ctx.gateway.list_states_by_domain(domain).await {
            Ok(states) => {
                let entries: Vec<Value> = states
                    .into_iter()
                    .map(|s| json!({ "entity_id": s.entity_id, "state": s.state }))
                    .collect();
                ToolOutput::ok(&call.id, json!(entries).to_string())
            }
            Err(err) => {
                ToolOutput::err(&call.id, aether_integrations::sanitize_external_error(&err))
            }
        }
    }
}
