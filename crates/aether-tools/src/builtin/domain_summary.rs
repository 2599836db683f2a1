// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Summarises a domain: entity count and a state-value histogram.
/// Read-only; built on top of the same query the domain listing uses.
pub struct GetDomainSummaryTool;

#[async_trait]
impl Tool for GetDomainSummaryTool {
    fn name(&self) -> &str {
        "get_domain_summary"
    }

    fn description(&self) -> &str {
        "Summarise a domain: how many entities it has and the distribution of their states."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": { "type": "string" }
            },
            "required": ["domain"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::Generic
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        let Some(domain) = call.args.get("domain").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing required argument: domain");
        };

        match ctx.gateway.list_states_by_domain(domain).await {
            Ok(states) => {
                let mut histogram = std::collections::BTreeMap::new();
                for state in &states {
                    *histogram.entry(state.state.clone()).or_insert(0u32) += 1;
                }
                ToolOutput::ok(
                    &call.id,
                    json!({
                        "domain": domain,
                        "entity_count": states.len(),
                        "states": histogram,
                    })
                    .to_string(),
                )
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
    use aether_integrations::EntityState;
    use std::collections::HashMap;

    #[tokio::test]
    async fn summarises_state_histogram() {
        let mut states = HashMap::new();
        for (id, state) in [("light.a", "on"), ("light.b", "on"), ("light.c", "off")] {
            states.insert(
                id.to_string(),
                EntityState { entity_id: id.into(), state: state.into(), attributes: json!({}) },
            );
        }
        let ctx = test_context_with_gateway(RecordingGateway { states, ..Default::default() });
        let call = ToolCall {
            id: "1".into(),
            name: "get_domain_summary".into(),
            args: json!({ "domain": "light" }),
        };
        let out = GetDomainSummaryTool.execute(&ctx, &call).await;
        let parsed: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(parsed["entity_count"], 3);
        assert_eq!(parsed["states"]["on"], 2);
        assert_eq!(parsed["states"]["off"], 1);
    }

    #[tokio::test]
    async fn empty_domain_has_zero_count() {
        let ctx = test_context_with_gateway(RecordingGateway::default());
        let call = ToolCall {
            id: "1".into(),
            name: "get_domain_summary".into(),
            args: json!({ "domain": "climate" }),
        };
        let out = GetDomainSummaryTool.execute(&ctx, &call).await;
        let parsed: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(parsed["entity_count"], 0);
    }
}
