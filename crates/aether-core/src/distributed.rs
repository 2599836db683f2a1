// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The distributed deployment path: an optional remote architect service
//! that streams a turn on the orchestrator's behalf instead of running the
//! model/tool loop in-process (§4.1 EXPANSION, resolves Open Question 1).
//!
//! The HTTP/SSE framing for that remote call is out of scope for this
//! crate — [`RemoteArchitect`] is only the seam the orchestrator talks to,
//! the same way [`aether_model::ModelProvider`] is a seam rather than an
//! HTTP client.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::agent::ChatRequest;
use crate::events::AgentEvent;

pub type RemoteEventStream = Pin<Box<dyn Stream<Item = anyhow::Result<AgentEvent>> + Send>>;

/// A remote architect service reachable under `DEPLOYMENT_MODE=distributed`.
#[async_trait]
pub trait RemoteArchitect: Send + Sync {
    /// Begin streaming a turn remotely. An `Err` returned here always means
    /// the stream was never started — bad URL, missing auth, a transport
    /// build error — and is always fallback-eligible.
    async fn stream(&self, req: &ChatRequest) -> anyhow::Result<RemoteEventStream>;
}

pub(crate) enum DistributedOutcome {
    /// The whole turn was driven remotely; the caller does nothing further.
    Completed,
    /// No byte of the remote stream was ever read; run the monolith path
    /// for this request exactly as if distributed had never been tried.
    Fallback,
}

/// Attempt the distributed path for one request.
///
/// Pre-first-byte failures (construction error, or the stream ending
/// before producing a single event) fall back silently, logged at `warn`.
/// Once the first event has been received, any later failure is forwarded
/// to the caller as a terminal `error` event — never a mid-stream fallback,
/// since tool side effects and agent-stack state may already have diverged
/// between the two paths.
pub(crate) async fn try_distributed(
    remote: &dyn RemoteArchitect,
    req: &ChatRequest,
    tx: &mpsc::Sender<AgentEvent>,
) -> DistributedOutcome {
    let mut stream = match remote.stream(req).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "distributed architect unavailable, falling back to monolith");
            return DistributedOutcome::Fallback;
        }
    };

    let first = match stream.next().await {
        None => return DistributedOutcome::Fallback,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "distributed architect failed before first byte, falling back to monolith");
            return DistributedOutcome::Fallback;
        }
        Some(Ok(event)) => event,
    };
    let _ = tx.send(first).await;

    while let Some(next) = stream.next().await {
        match next {
            Ok(event) => {
                let _ = tx.send(event).await;
            }
            Err(e) => {
                let _ = tx.send(AgentEvent::Error { message: e.to_string() }).await;
                let _ = tx.send(AgentEvent::Done).await;
                break;
            }
        }
    }
    DistributedOutcome::Completed
}
