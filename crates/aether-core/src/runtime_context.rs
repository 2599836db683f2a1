// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Ambient carrier for [`aether_tools::ExecutionContext`] (§4.3's dispatch
//! contract). Tool implementations read the context via
//! [`current`]/[`try_current`] instead of threading it through every call
//! site by hand; the orchestrator's tool-call loop is the only place that
//! calls [`scope`] to install it for the duration of one turn.

use std::future::Future;

use aether_tools::ExecutionContext;

tokio::task_local! {
    static EXECUTION_CONTEXT: ExecutionContext;
}

/// Runs `fut` with `ctx` installed as the ambient execution context for
/// every task-local lookup performed during its execution, including in
/// tasks spawned from within it (`tokio::task_local!` is inherited by
/// `.await`ed children, not by `tokio::spawn`).
pub async fn scope<F, T>(ctx: ExecutionContext, fut: F) -> T
where
    F: Future<Output = T>,
{
    EXECUTION_CONTEXT.scope(ctx, fut).await
}

/// Reads the ambient execution context installed by the enclosing
/// [`scope`] call. Panics outside one — every tool invocation happens
/// inside the orchestrator's dispatch loop, which always installs it
/// first, so this is treated as a programming error rather than a
/// recoverable failure.
pub fn current() -> ExecutionContext {
    EXECUTION_CONTEXT.with(|ctx| ctx.clone())
}

/// As [`current`], but `None` outside a [`scope`] instead of panicking.
/// Used by code paths (tests, the non-streaming single-shot path before a
/// conversation id is known) that may run before any scope is installed.
pub fn try_current() -> Option<ExecutionContext> {
    EXECUTION_CONTEXT.try_with(|ctx| ctx.clone()).ok()
}
