// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! In-process repository backend, keyed by entity id under a `RwLock`.
//! Intended for tests and single-process deployments without a durable
//! store behind them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{AnalysisReport, Conversation, Insight, InsightSchedule, Message};
use crate::proposal::{Proposal, ProposalStatus};
use crate::repository::{
    AnalysisReportRepository, ConversationRepository, InsightRepository,
    InsightScheduleRepository, MessageRepository, ProposalRepository, RepositoryError,
    RepositoryFactory,
};

#[derive(Default)]
pub struct InMemoryStore {
    conversations: RwLock<HashMap<Uuid, Conversation>>,
    messages: RwLock<HashMap<Uuid, Vec<Message>>>,
    proposals: RwLock<HashMap<Uuid, Proposal>>,
    insights: RwLock<HashMap<Uuid, Insight>>,
    reports: RwLock<HashMap<Uuid, AnalysisReport>>,
    schedules: RwLock<HashMap<Uuid, InsightSchedule>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryStore {
    async fn create(&self, conversation: Conversation) -> Result<Conversation, RepositoryError> {
        let mut guard = self.conversations.write().unwrap();
        guard.insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get(&self, id: Uuid) -> Result<Conversation, RepositoryError> {
        self.conversations
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound { kind: "conversation", id: id.to_string() })
    }

    async fn update(&self, conversation: Conversation) -> Result<Conversation, RepositoryError> {
        let mut guard = self.conversations.write().unwrap();
        if !guard.contains_key(&conversation.id) {
            return Err(RepositoryError::NotFound {
                kind: "conversation",
                id: conversation.id.to_string(),
            });
        }
        guard.insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn list_for_owner(&self, owner_user_id: &str) -> Result<Vec<Conversation>, RepositoryError> {
        Ok(self
            .conversations
            .read()
            .unwrap()
            .values()
            .filter(|c| c.owner_user_id == owner_user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn append(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut guard = self.messages.write().unwrap();
        guard.entry(message.conversation_id).or_default().push(message.clone());
        Ok(message)
    }

    async fn list_for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        Ok(self.messages.read().unwrap().get(&conversation_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ProposalRepository for InMemoryStore {
    async fn create(&self, proposal: Proposal) -> Result<Proposal, RepositoryError> {
        let mut guard = self.proposals.write().unwrap();
        guard.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    async fn get(&self, id: Uuid) -> Result<Proposal, RepositoryError> {
        self.proposals
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound { kind: "proposal", id: id.to_string() })
    }

    async fn update(&self, proposal: Proposal) -> Result<Proposal, RepositoryError> {
        let mut guard = self.proposals.write().unwrap();
        if !guard.contains_key(&proposal.id) {
            return Err(RepositoryError::NotFound { kind: "proposal", id: proposal.id.to_string() });
        }
        guard.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    async fn list_pending(&self) -> Result<Vec<Proposal>, RepositoryError> {
        Ok(self
            .proposals
            .read()
            .unwrap()
            .values()
            .filter(|p| p.status == ProposalStatus::Proposed)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InsightRepository for InMemoryStore {
    async fn create(&self, insight: Insight) -> Result<Insight, RepositoryError> {
        let mut guard = self.insights.write().unwrap();
        guard.insert(insight.id, insight.clone());
        Ok(insight)
    }

    async fn get(&self, id: Uuid) -> Result<Insight, RepositoryError> {
        self.insights
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound { kind: "insight", id: id.to_string() })
    }

    async fn update(&self, insight: Insight) -> Result<Insight, RepositoryError> {
        let mut guard = self.insights.write().unwrap();
        if !guard.contains_key(&insight.id) {
            return Err(RepositoryError::NotFound { kind: "insight", id: insight.id.to_string() });
        }
        guard.insert(insight.id, insight.clone());
        Ok(insight)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Insight>, RepositoryError> {
        let mut all: Vec<Insight> = self.insights.read().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        Ok(all)
    }
}

#[async_trait]
impl AnalysisReportRepository for InMemoryStore {
    async fn create(&self, report: AnalysisReport) -> Result<AnalysisReport, RepositoryError> {
        let mut guard = self.reports.write().unwrap();
        guard.insert(report.id, report.clone());
        Ok(report)
    }

    async fn get(&self, id: Uuid) -> Result<AnalysisReport, RepositoryError> {
        self.reports
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound { kind: "analysis_report", id: id.to_string() })
    }

    async fn update(&self, report: AnalysisReport) -> Result<AnalysisReport, RepositoryError> {
        let mut guard = self.reports.write().unwrap();
        if !guard.contains_key(&report.id) {
            return Err(RepositoryError::NotFound { kind: "analysis_report", id: report.id.to_string() });
        }
        guard.insert(report.id, report.clone());
        Ok(report)
    }
}

#[async_trait]
impl InsightScheduleRepository for InMemoryStore {
    async fn create(&self, schedule: InsightSchedule) -> Result<InsightSchedule, RepositoryError> {
        let mut guard = self.schedules.write().unwrap();
        guard.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn get(&self, id: Uuid) -> Result<InsightSchedule, RepositoryError> {
        self.schedules
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound { kind: "insight_schedule", id: id.to_string() })
    }

    async fn update(&self, schedule: InsightSchedule) -> Result<InsightSchedule, RepositoryError> {
        let mut guard = self.schedules.write().unwrap();
        if !guard.contains_key(&schedule.id) {
            return Err(RepositoryError::NotFound { kind: "insight_schedule", id: schedule.id.to_string() });
        }
        guard.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.schedules
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound { kind: "insight_schedule", id: id.to_string() })
    }

    async fn list_enabled(&self) -> Result<Vec<InsightSchedule>, RepositoryError> {
        Ok(self.schedules.read().unwrap().values().filter(|s| s.enabled).cloned().collect())
    }
}

impl RepositoryFactory for Arc<InMemoryStore> {
    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        self.clone()
    }
    fn messages(&self) -> Arc<dyn MessageRepository> {
        self.clone()
    }
    fn proposals(&self) -> Arc<dyn ProposalRepository> {
        self.clone()
    }
    fn insights(&self) -> Arc<dyn InsightRepository> {
        self.clone()
    }
    fn reports(&self) -> Arc<dyn AnalysisReportRepository> {
        self.clone()
    }
    fn schedules(&self) -> Arc<dyn InsightScheduleRepository> {
        self.clone()
    }
}
