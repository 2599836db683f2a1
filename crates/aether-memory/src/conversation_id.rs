// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Conversation identity derivation.
//!
//! Ordinary chat turns get a conversation id derived deterministically from
//! the first user message, so retrying the same opening message resumes the
//! same conversation instead of forking a new one. Background requests
//! (title generation, summarization) never round-trip through that
//! derivation — they get a fresh random id every time, since there's no
//! notion of "resuming" a fire-and-forget request.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Patterns identifying a request as a background task rather than a
/// user-facing conversation turn. Matched case-insensitively against the
/// first system or user message.
const BACKGROUND_MARKERS: &[&str] = &[
    "generate a title",
    "generate a short title",
    "summarize this conversation",
    "background task",
];

pub fn derive_conversation_id(first_user_message: &str) -> Uuid {
    let digest = Sha256::digest(first_user_message.as_bytes());
    let hex = format!("{:x}", digest);
    let hex = &hex[..32];

    let uuid_str = format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    );
    Uuid::parse_str(&uuid_str).expect("32 hex chars always format into a valid UUID")
}

pub fn is_background_request(message: &str) -> bool {
    let lower = message.to_lowercase();
    BACKGROUND_MARKERS.iter().any(|marker| lower.contains(marker))
}
