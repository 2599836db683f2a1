// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Renders a controller-side templating expression against live state,
/// without persisting or acting on the result. Read-only.
pub struct RenderTemplateTool;

#[async_trait]
impl Tool for RenderTemplateTool {
    fn name(&self) -> &str {
        "render_template"
    }

    fn description(&self) -> &str {
        "Render a templating expression against the controller's live state and return the result."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "template": { "type": "string" }
            },
            "required": ["template"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::Generic
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        let Some(template) = call.args.get("template").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing required argument: template");
        };

        match ctx.gateway.render_template(template).await {
            Ok(rendered) => ToolOutput::ok(&call.id, rendered),
            Err(err) => {
                ToolOutput::err(&call.id, aether_integrations::sanitize_external_error(&err))
            }
        }
    }
}
