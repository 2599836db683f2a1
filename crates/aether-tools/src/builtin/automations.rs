// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Lists every configured automation and whether it's enabled. Read-only.
pub struct ListAutomationsTool;

#[async_trait]
impl Tool for ListAutomationsTool {
    fn name(&self) -> &str {
        "list_automations"
    }

    fn description(&self) -> &str {
        "List every configured automation with its enabled/disabled state."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::MatchList
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        match ctx.gateway.list_automations().await {
            Ok(automations) => {
                let entries: Vec<Value> = automations
                    .into_iter()
                    .map(|a| {
                        json!({
                            "entity_id": a.entity_id,
                            "friendly_name": a.friendly_name,
                            "enabled": a.enabled,
                        })
                    })
                    .collect();
                ToolOutput::ok(&call.id, json!(entries).to_string())
            }
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
    use aether_integrations::AutomationSummary;

    #[tokio::test]
    async fn lists_configured_automations() {
        let automations = vec![AutomationSummary {
            entity_id: "automation.night_mode".into(),
            friendly_name: "Night mode".into(),
            enabled: true,
        }];
        let ctx = test_context_with_gateway(RecordingGateway { automations, ..Default::default() });
        let call = ToolCall { id: "1".into(), name: "list_automations".into(), args: json!({}) };
        let out = ListAutomationsTool.execute(&ctx, &call).await;
        assert!(out.content.contains("night_mode"));
    }

    #[tokio::test]
    async fn empty_automations_yields_empty_list() {
        let ctx = test_context_with_gateway(RecordingGateway::default());
        let call = ToolCall { id: "1".into(), name: "list_automations".into(), args: json!({}) };
        let out = ListAutomationsTool.execute(&ctx, &call).await;
        assert_eq!(out.content, "[]");
    }
}
