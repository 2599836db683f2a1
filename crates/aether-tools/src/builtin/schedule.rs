// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use aether_memory::InsightSchedule;

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Creates a recurring insight-generation schedule, reconciled into the
/// scheduler's job table on its next sync pass (§4.4). Not mutating: it
/// only writes a local row, never touches the controller.
pub struct CreateInsightScheduleTool;

#[async_trait]
impl Tool for CreateInsightScheduleTool {
    fn name(&self) -> &str {
        "create_insight_schedule"
    }

    fn description(&self) -> &str {
        "Create a recurring schedule that periodically runs an analysis and files its findings as insights."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "label": { "type": "string" },
                "cron_expression": {
                    "type": "string",
                    "description": "Standard 5-field cron expression, e.g. '0 2 * * *'"
                }
            },
            "required": ["label", "cron_expression"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::Generic
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        let (Some(label), Some(cron_expression)) = (
            call.args.get("label").and_then(Value::as_str),
            call.args.get("cron_expression").and_then(Value::as_str),
        ) else {
            return ToolOutput::err(&call.id, "missing required argument: label or cron_expression");
        };

        let schedule = InsightSchedule::new_cron(label, cron_expression);
        match ctx.repositories.schedules().create(schedule).await {
            Ok(created) => ToolOutput::ok(
                &call.id,
                json!({ "schedule_id": created.id, "label": created.label }).to_string(),
            ),
            Err(err) => ToolOutput::err(&call.id, err.to_string()),
        }
    }
}
