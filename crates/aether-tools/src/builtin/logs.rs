// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

const DEFAULT_LIMIT: usize = 50;

/// Tails the controller's own log, capped at a caller-supplied limit.
/// Read-only; classed `HeadTail` since the newest lines matter most.
pub struct GetHaLogsTool;

#[async_trait]
impl Tool for GetHaLogsTool {
    fn name(&self) -> &str {
        "get_ha_logs"
    }

    fn description(&self) -> &str {
        "Fetch the controller's recent log lines, most recent first."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": { "type": "integer", "minimum": 1, "default": DEFAULT_LIMIT }
            }
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::HeadTail
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        let limit = call
            .args
            .get("limit")
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_LIMIT);

        match ctx.gateway.get_logs(limit).await {
            Ok(lines) => ToolOutput::ok(&call.id, lines.join("\n")),
            Err(err) => {
                ToolOutput::err(&call.id, aether_integrations::sanitize_external_error(&err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context_with_gateway;
    use aether_integrations::gateway::test_support::RecordingGateway;

    #[tokio::test]
    async fn returns_logs_up_to_limit() {
        let logs = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ctx = test_context_with_gateway(RecordingGateway { logs, ..Default::default() });
        let call = ToolCall {
            id: "1".into(),
            name: "get_ha_logs".into(),
            args: json!({ "limit": 2 }),
        };
        let out = GetHaLogsTool.execute(&ctx, &call).await;
        assert_eq!(out.content, "a\nb");
    }

    #[tokio::test]
    async fn defaults_limit_when_absent() {
        let ctx = test_context_with_gateway(RecordingGateway::default());
        let call = ToolCall { id: "1".into(), name: "get_ha_logs".into(), args: json!({}) };
        let out = GetHaLogsTool.execute(&ctx, &call).await;
        assert!(!out.is_error);
    }
}
