// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Entities reified by the orchestration core: `Conversation`, `Message`,
//! `Insight`, `AnalysisReport`, and `InsightSchedule`. `Proposal` has its own
//! module ([`crate::proposal`]) because its state machine is load-bearing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub owner_user_id: String,
    pub status: ConversationStatus,
    pub context: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: Uuid, owner_user_id: impl Into<String>) -> Self {
        Self {
            id,
            owner_user_id: owner_user_id.into(),
            status: ConversationStatus::Active,
            context: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Status only ever moves forward: Active -> Completed -> Archived.
    /// Returns `false` (and leaves status unchanged) for a backward move.
    pub fn advance_status(&mut self, to: ConversationStatus) -> bool {
        let rank = |s: ConversationStatus| match s {
            ConversationStatus::Active => 0,
            ConversationStatus::Completed => 1,
            ConversationStatus::Archived => 2,
        };
        if rank(to) <= rank(self.status) {
            return false;
        }
        self.status = to;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub tool_calls: Vec<Value>,
    pub tool_call_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Automation,
    EntityCommand,
    Script,
    Scene,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightStatus {
    Pending,
    Reviewed,
    Actioned,
    Dismissed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub classification: String,
    pub title: String,
    pub description: String,
    pub evidence: HashMap<String, Value>,
    pub confidence: f64,
    pub impact: ImpactLevel,
    pub related_entity_ids: Vec<String>,
    pub script_location: Option<String>,
    pub script_output: Option<String>,
    pub status: InsightStatus,
    pub conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(title: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            classification: classification.into(),
            title: title.into(),
            description: String::new(),
            evidence: HashMap::new(),
            confidence: 0.0,
            impact: ImpactLevel::Low,
            related_entity_ids: Vec::new(),
            script_location: None,
            script_output: None,
            status: InsightStatus::Pending,
            conversation_id: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Diagnostic,
    Efficiency,
    Security,
    Comfort,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    Quick,
    Standard,
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStrategy {
    Parallel,
    Teamwork,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommLogEntry {
    pub from_agent: String,
    pub to_agent: String,
    pub kind: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub title: String,
    pub analysis_type: AnalysisType,
    pub depth: AnalysisDepth,
    pub strategy: AnalysisStrategy,
    pub status: ReportStatus,
    pub summary: Option<String>,
    pub insight_ids: Vec<Uuid>,
    pub artifact_paths: Vec<String>,
    pub communication_log: Vec<CommLogEntry>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisReport {
    pub fn start(
        title: impl Into<String>,
        analysis_type: AnalysisType,
        depth: AnalysisDepth,
        strategy: AnalysisStrategy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            analysis_type,
            depth,
            strategy,
            status: ReportStatus::Running,
            summary: None,
            insight_ids: Vec::new(),
            artifact_paths: Vec::new(),
            communication_log: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Moves Running -> Completed exactly once. A second call is a no-op
    /// (the invariant is "no further transitions", not an error — callers
    /// that call this twice by mistake should not crash the analysis
    /// pipeline on its own bookkeeping).
    pub fn complete(&mut self, summary: impl Into<String>) {
        if self.status != ReportStatus::Running {
            return;
        }
        self.status = ReportStatus::Completed;
        self.summary = Some(summary.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, summary: impl Into<String>) {
        if self.status != ReportStatus::Running {
            return;
        }
        self.status = ReportStatus::Failed;
        self.summary = Some(summary.into());
        self.completed_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Cron,
    Webhook,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastResult {
    Success,
    Failed,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSchedule {
    pub id: Uuid,
    pub label: String,
    pub enabled: bool,
    pub analysis_type: AnalysisType,
    pub entity_ids: Option<Vec<String>>,
    pub lookback_hours: u32,
    pub options: HashMap<String, Value>,
    pub trigger_kind: TriggerKind,
    pub cron_expression: Option<String>,
    pub event_label: Option<String>,
    pub match_filter: HashMap<String, String>,
    pub depth: AnalysisDepth,
    pub strategy: AnalysisStrategy,
    pub timeout_override_seconds: Option<u32>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_result: Option<LastResult>,
    pub last_error: Option<String>,
    pub run_count: u64,
}

impl InsightSchedule {
    /// Construct a Cron-triggered schedule. `lookback_hours` is clamped into
    /// [1, 8760] per the data-model invariant.
    pub fn new_cron(label: impl Into<String>, cron_expression: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            enabled: true,
            analysis_type: AnalysisType::Diagnostic,
            entity_ids: None,
            lookback_hours: 24,
            options: HashMap::new(),
            trigger_kind: TriggerKind::Cron,
            cron_expression: Some(cron_expression.into()),
            event_label: None,
            match_filter: HashMap::new(),
            depth: AnalysisDepth::Standard,
            strategy: AnalysisStrategy::Parallel,
            timeout_override_seconds: None,
            last_run_at: None,
            last_result: None,
            last_error: None,
            run_count: 0,
        }
    }

    pub fn new_webhook(label: impl Into<String>, event_label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            enabled: true,
            analysis_type: AnalysisType::Diagnostic,
            entity_ids: None,
            lookback_hours: 24,
            options: HashMap::new(),
            trigger_kind: TriggerKind::Webhook,
            cron_expression: None,
            event_label: Some(event_label.into()),
            match_filter: HashMap::new(),
            depth: AnalysisDepth::Standard,
            strategy: AnalysisStrategy::Parallel,
            timeout_override_seconds: None,
            last_run_at: None,
            last_result: None,
            last_error: None,
            run_count: 0,
        }
    }

    pub fn job_id(&self) -> String {
        format!("insight_schedule:{}", self.id)
    }

    pub fn record_run(&mut self, success: bool, error: Option<String>) {
        self.last_run_at = Some(Utc::now());
        self.last_result = Some(if success { LastResult::Success } else { LastResult::Failed });
        self.last_error = error;
        self.run_count += 1;
    }

    pub fn record_timeout(&mut self) {
        self.last_run_at = Some(Utc::now());
        self.last_result = Some(LastResult::Timeout);
        self.last_error = Some("timed out".to_string());
        self.run_count += 1;
    }
}
