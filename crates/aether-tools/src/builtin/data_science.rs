// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Runs a diagnostic pass over a set of entities and files the findings
//! as `Insight` rows under a completed `AnalysisReport`. This is the tool
//! the §4.2 tool→agent table attributes to `data_science_team`; the
//! architect's loop still runs it directly (the attribution is for trace
//! colouring only).

use async_trait::async_trait;
use serde_json::{json, Value};

use aether_memory::{AnalysisDepth, AnalysisReport, AnalysisStrategy, AnalysisType, ImpactLevel, Insight};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Anything whose state is anything other than these is flagged as a
/// candidate insight — this is a placeholder heuristic standing in for
/// the real statistical model; it exists to exercise the report/insight
/// lifecycle end to end.
const EXPECTED_OFF_STATES: &[&str] = &["off", "idle", "unavailable"];

pub struct ConsultDataScienceTeamTool;

#[async_trait]
impl Tool for ConsultDataScienceTeamTool {
    fn name(&self) -> &str {
        "consult_data_science_team"
    }

    fn description(&self) -> &str {
        "Run a diagnostic analysis over a set of entities and file any findings as insights."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "entity_ids": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["title", "entity_ids"]
        })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::Generic
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        let Some(title) = call.args.get("title").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing required argument: title");
        };
        let entity_ids: Vec<String> = match call.args.get("entity_ids").and_then(Value::as_array) {
            Some(arr) => arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
            None => return ToolOutput::err(&call.id, "missing required argument: entity_ids"),
        };

        let mut report = AnalysisReport::start(
            title,
            AnalysisType::Diagnostic,
            AnalysisDepth::Standard,
            AnalysisStrategy::Parallel,
        );

        let mut filed = Vec::new();
        for entity_id in &entity_ids {
            let state = match ctx.gateway.get_state(entity_id).await {
                Ok(Some(state)) => state,
                Ok(None) => continue,
                Err(err) => {
                    report.fail(aether_integrations::sanitize_external_error(&err));
                    let _ = ctx.repositories.reports().create(report).await;
                    return ToolOutput::err(&call.id, "analysis aborted: controller unreachable");
                }
            };
            if !EXPECTED_OFF_STATES.contains(&state.state.as_str()) {
                let mut insight = Insight::new(
                    format!("{entity_id} is {}", state.state),
                    "diagnostic",
                );
                insight.related_entity_ids = vec![entity_id.clone()];
                insight.impact = ImpactLevel::Low;
                if let Ok(created) = ctx.repositories.insights().create(insight).await {
                    report.insight_ids.push(created.id);
                    filed.push(created.id);
                }
            }
        }

        let summary = format!("analyzed {} entities, filed {} insights", entity_ids.len(), filed.len());
        report.complete(summary.clone());
        match ctx.repositories.reports().create(report).await {
            Ok(stored) => ToolOutput::ok(
                &call.id,
                json!({ "report_id": stored.id, "summary": summary, "insight_ids": filed }).to_string(),
            ),
            Err(err) => ToolOutput::err(&call.id, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context_with_gateway;
    use aether_integrations::gateway::test_support::RecordingGateway;
    use aether_integrations::EntityState;
    use aether_memory::ReportStatus;
    use std::collections::HashMap;

    fn gateway() -> RecordingGateway {
        let mut states = HashMap::new();
        states.insert(
            "light.kitchen".to_string(),
            EntityState { entity_id: "light.kitchen".into(), state: "on".into(), attributes: json!({}) },
        );
        states.insert(
            "light.hallway".to_string(),
            EntityState { entity_id: "light.hallway".into(), state: "off".into(), attributes: json!({}) },
        );
        RecordingGateway { states, ..Default::default() }
    }

    #[tokio::test]
    async fn files_insight_only_for_unexpected_state() {
        let ctx = test_context_with_gateway(gateway());
        let call = ToolCall {
            id: "1".into(),
            name: "consult_data_science_team".into(),
            args: json!({
                "title": "overnight check",
                "entity_ids": ["light.kitchen", "light.hallway"]
            }),
        };
        let out = ConsultDataScienceTeamTool.execute(&ctx, &call).await;
        assert!(!out.is_error);
        let parsed: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(parsed["insight_ids"].as_array().unwrap().len(), 1);

        let insights = ctx.repositories.insights().list_recent(10).await.unwrap();
        assert_eq!(insights.len(), 1);
        assert!(insights[0].title.contains("light.kitchen"));
    }

    #[tokio::test]
    async fn report_is_completed_not_left_running() {
        let ctx = test_context_with_gateway(gateway());
        let call = ToolCall {
            id: "1".into(),
            name: "consult_data_science_team".into(),
            args: json!({ "title": "check", "entity_ids": ["light.kitchen"] }),
        };
        let out = ConsultDataScienceTeamTool.execute(&ctx, &call).await;
        let parsed: Value = serde_json::from_str(&out.content).unwrap();
        let report_id: uuid::Uuid =
            serde_json::from_value(parsed["report_id"].clone()).unwrap();
        let report = ctx.repositories.reports().get(report_id).await.unwrap();
        assert_eq!(report.status, ReportStatus::Completed);
    }

    #[tokio::test]
    async fn errors_when_entity_ids_missing() {
        let ctx = test_context_with_gateway(gateway());
        let call = ToolCall {
            id: "1".into(),
            name: "consult_data_science_team".into(),
            args: json!({ "title": "check" }),
        };
        let out = ConsultDataScienceTeamTool.execute(&ctx, &call).await;
        assert!(out.is_error);
    }
}
