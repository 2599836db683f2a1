// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Outbound RPC to the external controller and the error-sanitisation
//! helper required wherever an `ExternalError` crosses into a caller-facing
//! event.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceCallError {
    #[error("controller call timed out")]
    Timeout,
    #[error("controller rejected the call: {0}")]
    Rejected(String),
    #[error("controller transport error: {0}")]
    Transport(String),
}

/// `call_service(domain, service, data)`: assumed idempotent at the
/// caller, but not necessarily at the controller. Any non-success return
/// is treated by callers as "effect not applied" — there is no partial
/// success state.
#[async_trait]
pub trait ControllerClient: Send + Sync {
    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: Value,
    ) -> Result<(), ServiceCallError>;
}

/// Strips anything that could leak internal structure (stack traces,
/// filesystem paths, connection strings) from an external-facing error
/// message, leaving only the variant's short, caller-safe summary.
pub fn sanitize_external_error(err: &ServiceCallError) -> String {
    match err {
        ServiceCallError::Timeout => "the controller did not respond in time".to_string(),
        ServiceCallError::Rejected(_) => "the controller rejected the request".to_string(),
        ServiceCallError::Transport(_) => "could not reach the controller".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_messages_never_echo_raw_detail() {
        let err = ServiceCallError::Transport("connect ECONNREFUSED 10.0.0.5:8123".to_string());
        let message = sanitize_external_error(&err);
        assert!(!message.contains("10.0.0.5"));
        assert!(!message.contains("ECONNREFUSED"));
    }

    #[test]
    fn rejected_message_omits_raw_reason() {
        let err = ServiceCallError::Rejected("unknown entity light.nonexistent".to_string());
        let message = sanitize_external_error(&err);
        assert!(!message.contains("light.nonexistent"));
    }
}
