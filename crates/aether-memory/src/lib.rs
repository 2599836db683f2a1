// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Entity types, the proposal state machine, and repository traits with an
//! in-process implementation.
//!
//! Persistent storage is explicitly out of scope for the orchestration
//! core — every repository here is a trait, so a real SQL-backed crate can
//! implement it without this crate changing. [`memory`] provides the
//! in-process backend used by tests and by any caller that doesn't need
//! durability across restarts.

mod conversation_id;
mod entities;
mod memory;
mod proposal;
mod repository;

pub use conversation_id::{derive_conversation_id, is_background_request};
pub use entities::{
    AnalysisDepth, AnalysisReport, AnalysisStrategy, AnalysisType, CommLogEntry, Conversation,
    ConversationStatus, ImpactLevel, Insight, InsightSchedule, InsightStatus, Message,
    MessageRole, ProposalKind, ReportStatus, TriggerKind,
};
pub use memory::InMemoryStore;
pub use proposal::{Proposal, ProposalError, ProposalStatus};
pub use repository::{
    AnalysisReportRepository, ConversationRepository, InsightRepository,
    InsightScheduleRepository, MessageRepository, ProposalRepository, RepositoryError,
    RepositoryFactory,
};
