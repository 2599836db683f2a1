// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::policy::ApprovalPolicy;
use crate::tool::{OutputCategory, Tool, ToolCall, ToolOutput};

/// Validates the controller's configuration without reloading it.
/// Read-only: a check, never a write.
pub struct CheckHaConfigTool;

#[async_trait]
impl Tool for CheckHaConfigTool {
    fn name(&self) -> &str {
        "check_ha_config"
    }

    fn description(&self) -> &str {
        "Validate the controller's current configuration; does not reload or change anything."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn default_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::Auto
    }

    fn output_category(&self) -> OutputCategory {
        OutputCategory::Generic
    }

    async fn execute(&self, ctx: &ExecutionContext, call: &ToolCall) -> ToolOutput {
        match ctx.gateway.check_config().await {
            Ok(()) => ToolOutput::ok(&call.id, "configuration is valid"),
            Err(err) => {
                ToolOutput::err(&call.id, aether_integrations::sanitize_external_error(&err))
            }
        }
    }
}
