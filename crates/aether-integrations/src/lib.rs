// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Post-analysis notification gating and the outbound controller RPC seam.

mod controller;
pub mod gateway;
mod notifier;
mod webhook;

pub use controller::{sanitize_external_error, ControllerClient, ServiceCallError};
pub use gateway::{AutomationSummary, EntityState, HomeAssistantGateway};
pub use notifier::{InsightNotifier, Notification, NotificationSink};
pub use webhook::{
    AnalysisRunner, GatewayRegistrySync, RegistrySync, WebhookDispatcher, WebhookEvent,
    WebhookOutcome,
};
