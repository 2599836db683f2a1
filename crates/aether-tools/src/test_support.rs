// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Shared fixtures for tool unit tests. Not part of the public API.

#![cfg(test)]

use std::sync::Arc;

use aether_integrations::gateway::test_support::RecordingGateway;
use aether_memory::InMemoryStore;
use uuid::Uuid;

use crate::context::{ExecutionContext, ModelContext};

pub fn test_context() -> ExecutionContext {
    test_context_with_gateway(RecordingGateway::default())
}

pub fn test_context_with_gateway(gateway: RecordingGateway) -> ExecutionContext {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    ExecutionContext::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        ModelContext { model: "test-model".to_string(), temperature: 0.2 },
        Arc::new(store),
        Arc::new(gateway),
    )
}
