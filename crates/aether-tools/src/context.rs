// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The structured context every tool invocation receives (§4.3's dispatch
//! contract): the conversation identifier, the committing repository
//! factory, the parent-span identifier for trace linking, and the active
//! model context. Threaded explicitly here; `aether-core` additionally
//! stashes a clone in a `tokio::task_local!` so nested async calls that
//! don't take it as a parameter can still reach it.

use std::sync::Arc;

use aether_integrations::HomeAssistantGateway;
use aether_memory::RepositoryFactory;
use uuid::Uuid;

/// The model name and temperature in effect for the turn a tool is
/// running within.
#[derive(Debug, Clone)]
pub struct ModelContext {
    pub model: String,
    pub temperature: f32,
}

#[derive(Clone)]
pub struct ExecutionContext {
    pub conversation_id: Uuid,
    pub trace_parent_span: Uuid,
    pub model_context: ModelContext,
    pub repositories: Arc<dyn RepositoryFactory>,
    pub gateway: Arc<dyn HomeAssistantGateway>,
}

impl ExecutionContext {
    pub fn new(
        conversation_id: Uuid,
        trace_parent_span: Uuid,
        model_context: ModelContext,
        repositories: Arc<dyn RepositoryFactory>,
        gateway: Arc<dyn HomeAssistantGateway>,
    ) -> Self {
        Self { conversation_id, trace_parent_span, model_context, repositories, gateway }
    }
}
