// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Read-only query surface against the external controller. Distinct from
//! [`crate::ControllerClient`], which is mutating-only (`call_service`):
//! query tools never trigger the HITL approval gate, so they're kept
//! behind a separate trait rather than overloading one seam with both
//! read and write semantics.

use async_trait::async_trait;
use serde_json::Value;

use crate::ServiceCallError;

/// One entity's current state, as the query surface reports it.
#[derive(Debug, Clone)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    pub attributes: Value,
}

/// One automation's summary row, as `list_automations` reports it.
#[derive(Debug, Clone)]
pub struct AutomationSummary {
    pub entity_id: String,
    pub friendly_name: String,
    pub enabled: bool,
}

#[async_trait]
pub trait HomeAssistantGateway: Send + Sync {
    async fn get_state(&self, entity_id: &str) -> Result<Option<EntityState>, ServiceCallError>;
    async fn list_states_by_domain(&self, domain: &str)
        -> Result<Vec<EntityState>, ServiceCallError>;
    async fn search_entities(&self, query: &str) -> Result<Vec<EntityState>, ServiceCallError>;
    async fn list_automations(&self) -> Result<Vec<AutomationSummary>, ServiceCallError>;
    async fn render_template(&self, template: &str) -> Result<String, ServiceCallError>;
    async fn get_logs(&self, limit: usize) -> Result<Vec<String>, ServiceCallError>;
    async fn check_config(&self) -> Result<(), ServiceCallError>;
}

/// Exposed unconditionally (not `#[cfg(test)]`) so downstream crates'
/// own test suites can depend on it across the crate boundary.
pub mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in used by downstream crates' tests; keeps a fixed
    /// table of entity states and records query calls for assertions.
    #[derive(Default)]
    pub struct RecordingGateway {
        pub states: HashMap<String, EntityState>,
        pub automations: Vec<AutomationSummary>,
        pub logs: Vec<String>,
        pub config_ok: bool,
        pub calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HomeAssistantGateway for RecordingGateway {
        async fn get_state(
            &self,
            entity_id: &str,
        ) -> Result<Option<EntityState>, ServiceCallError> {
            self.calls.lock().unwrap().push(format!("get_state:{entity_id}"));
            Ok(self.states.get(entity_id).cloned())
        }

        async fn list_states_by_domain(
            &self,
            domain: &str,
        ) -> Result<Vec<EntityState>, ServiceCallError> {
            self.calls.lock().unwrap().push(format!("list_states_by_domain:{domain}"));
            Ok(self
                .states
                .values()
                .filter(|s| s.entity_id.starts_with(&format!("{domain}.")))
                .cloned()
                .collect())
        }

        async fn search_entities(&self, query: &str) -> Result<Vec<EntityState>, ServiceCallError> {
            self.calls.lock().unwrap().push(format!("search_entities:{query}"));
            Ok(self
                .states
                .values()
                .filter(|s| s.entity_id.contains(query))
                .cloned()
                .collect())
        }

        async fn list_automations(&self) -> Result<Vec<AutomationSummary>, ServiceCallError> {
            self.calls.lock().unwrap().push("list_automations".to_string());
            Ok(self.automations.clone())
        }

        async fn render_template(&self, template: &str) -> Result<String, ServiceCallError> {
            self.calls.lock().unwrap().push(format!("render_template:{template}"));
            Ok(template.to_string())
        }

        async fn get_logs(&self, limit: usize) -> Result<Vec<String>, ServiceCallError> {
            self.calls.lock().unwrap().push(format!("get_logs:{limit}"));
            Ok(self.logs.iter().take(limit).cloned().collect())
        }

        async fn check_config(&self) -> Result<(), ServiceCallError> {
            self.calls.lock().unwrap().push("check_config".to_string());
            if self.config_ok {
                Ok(())
            } else {
                Err(ServiceCallError::Rejected("invalid configuration".to_string()))
            }
        }
    }
}
