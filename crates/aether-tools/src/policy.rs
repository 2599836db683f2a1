// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Per-tool approval policy. Unlike a shell-command allowlist, there is no
//! free-text command string to pattern-match here — every tool is a typed
//! call with a fixed name, so the policy a tool carries is the static
//! value its [`crate::Tool::default_policy`] returns. The HITL gate (§4.6)
//! separately routes anything with `is_mutating() == true` regardless of
//! this policy; `ApprovalPolicy` governs read-only tools the operator may
//! still want to gate (e.g. a verbose log dump).

/// Per-tool approval policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalPolicy {
    /// Always run without asking
    Auto,
    /// Ask the operator before each invocation
    Ask,
    /// Never run; return an error
    Deny,
}
