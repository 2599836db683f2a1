// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Repository traits for the orchestration core's entities.
//!
//! Every trait here is storage-agnostic; [`crate::memory::InMemoryStore`] is
//! the only implementation this crate ships. A durable implementation lives
//! outside this crate and only needs to satisfy the same traits.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{AnalysisReport, Conversation, Insight, InsightSchedule, Message};
use crate::proposal::Proposal;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("backing store error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create(&self, conversation: Conversation) -> Result<Conversation, RepositoryError>;
    async fn get(&self, id: Uuid) -> Result<Conversation, RepositoryError>;
    async fn update(&self, conversation: Conversation) -> Result<Conversation, RepositoryError>;
    async fn list_for_owner(&self, owner_user_id: &str) -> Result<Vec<Conversation>, RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn append(&self, message: Message) -> Result<Message, RepositoryError>;
    async fn list_for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError>;
}

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    async fn create(&self, proposal: Proposal) -> Result<Proposal, RepositoryError>;
    async fn get(&self, id: Uuid) -> Result<Proposal, RepositoryError>;
    async fn update(&self, proposal: Proposal) -> Result<Proposal, RepositoryError>;
    async fn list_pending(&self) -> Result<Vec<Proposal>, RepositoryError>;
}

#[async_trait]
pub trait InsightRepository: Send + Sync {
    async fn create(&self, insight: Insight) -> Result<Insight, RepositoryError>;
    async fn get(&self, id: Uuid) -> Result<Insight, RepositoryError>;
    async fn update(&self, insight: Insight) -> Result<Insight, RepositoryError>;
    async fn list_recent(&self, limit: usize) -> Result<Vec<Insight>, RepositoryError>;
}

#[async_trait]
pub trait AnalysisReportRepository: Send + Sync {
    async fn create(&self, report: AnalysisReport) -> Result<AnalysisReport, RepositoryError>;
    async fn get(&self, id: Uuid) -> Result<AnalysisReport, RepositoryError>;
    async fn update(&self, report: AnalysisReport) -> Result<AnalysisReport, RepositoryError>;
}

#[async_trait]
pub trait InsightScheduleRepository: Send + Sync {
    async fn create(&self, schedule: InsightSchedule) -> Result<InsightSchedule, RepositoryError>;
    async fn get(&self, id: Uuid) -> Result<InsightSchedule, RepositoryError>;
    async fn update(&self, schedule: InsightSchedule) -> Result<InsightSchedule, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    async fn list_enabled(&self) -> Result<Vec<InsightSchedule>, RepositoryError>;
}

/// The committing session-factory named in the dispatch contract (§4.3):
/// a single handle tool implementations use to reach every repository
/// without each one threading six separate constructor arguments.
/// Bundled behind `Arc` so it can be cloned into an `ExecutionContext`
/// cheaply per tool invocation.
pub trait RepositoryFactory: Send + Sync {
    fn conversations(&self) -> Arc<dyn ConversationRepository>;
    fn messages(&self) -> Arc<dyn MessageRepository>;
    fn proposals(&self) -> Arc<dyn ProposalRepository>;
    fn insights(&self) -> Arc<dyn InsightRepository>;
    fn reports(&self) -> Arc<dyn AnalysisReportRepository>;
    fn schedules(&self) -> Arc<dyn InsightScheduleRepository>;
}
