// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Fetches a single entity's current state and attributes. Read-only.
pub struct GetEntityStateTool;

#[async_trait]
impl Tool for GetEntityStateTool {
    fn name(&self) -> &str {
        "get_entity_state"
    }

    fn description(&self) -> &str {
        "Get the current state and attributes of one home-automation entity by its entity_id."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "entity_id": { "type": "string", "description": "e.g. light.kitchen" }
            },
            "required": ["entity_id"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::Generic
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        let Some(entity_id) = call.args.get("entity_id").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing required argument: entity_id");
        };

        match ctx.gateway.get_state(entity_id).await {
            Ok(Some(state)) => ToolOutput::ok(
                &call.id,
                json!({
                    "entity_id": state.entity_id,
                    "state": state.state,
                    "attributes": state.attributes,
                })
                .to_string(),
            ),
            Ok(None) => ToolOutput::err(&call.id, format!("no such entity: {entity_id}")),
            Err(err) => {
                ToolOutput::err(&call.id, aether_integrations::sanitize_external_error(&err))
            }
        }
    }
}
