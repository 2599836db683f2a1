// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Inbound webhook dispatch (§6): authenticates the request, then routes
//! on `event_type` to one of three paths — a registry sync, a proposal
//! approve/reject decision, or match-filtered analysis fan-out against
//! the `Webhook`-kind schedules.
//!
//! The HTTP framing that calls into [`WebhookDispatcher::dispatch`] is
//! out of scope here, the same way the transport for [`crate::ControllerClient`]
//! is out of scope — this module only owns what happens once a request
//! body has already been parsed and authenticated.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use aether_memory::{InsightSchedule, InsightScheduleRepository, ProposalRepository, TriggerKind};

use crate::gateway::HomeAssistantGateway;

/// Body of an inbound webhook POST.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event_type: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    /// The event label a `Webhook`-kind schedule's `event_label` is
    /// matched against. `None` only matches schedules with no label set.
    #[serde(default)]
    pub webhook_event: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Re-syncs the controller's registry of automations/scripts/scenes.
/// Queued on `entity_registry_updated`; never touches entity state
/// itself, which the debouncer/snapshot path already owns.
#[async_trait]
pub trait RegistrySync: Send + Sync {
    async fn sync(&self) -> anyhow::Result<()>;
}

/// Runs one schedule's analysis for a matched webhook event. Construction
/// of the actual analysis pipeline lives with the orchestrator; this is
/// only the seam the dispatcher calls into, mirroring how
/// [`aether_model::ModelProvider`] is a seam rather than a concrete model
/// client.
#[async_trait]
pub trait AnalysisRunner: Send + Sync {
    async fn run(&self, schedule: &InsightSchedule, event: &WebhookEvent) -> anyhow::Result<()>;
}

/// Calls [`HomeAssistantGateway::list_automations`] and discards the
/// result — the registry-sync trigger only needs the call to happen, not
/// its contents; callers needing the summary should query the gateway
/// directly instead of going through this path.
pub struct GatewayRegistrySync {
    gateway: Arc<dyn HomeAssistantGateway>,
}

impl GatewayRegistrySync {
    pub fn new(gateway: Arc<dyn HomeAssistantGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl RegistrySync for GatewayRegistrySync {
    async fn sync(&self) -> anyhow::Result<()> {
        self.gateway
            .list_automations()
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Unauthorized,
    RegistrySyncQueued,
    ProposalDecisionApplied { proposal_id: Uuid, approved: bool },
    ProposalActionRejected { reason: String },
    AnalysesQueued { matched: usize },
    NoMatch,
}

pub struct WebhookDispatcher {
    secret: Option<String>,
    schedules: Arc<dyn InsightScheduleRepository>,
    proposals: Arc<dyn ProposalRepository>,
    registry_sync: Arc<dyn RegistrySync>,
    analysis: Arc<dyn AnalysisRunner>,
}

impl WebhookDispatcher {
    pub fn new(
        secret: Option<String>,
        schedules: Arc<dyn InsightScheduleRepository>,
        proposals: Arc<dyn ProposalRepository>,
        registry_sync: Arc<dyn RegistrySync>,
        analysis: Arc<dyn AnalysisRunner>,
    ) -> Self {
        Self { secret, schedules, proposals, registry_sync, analysis }
    }

    /// `header_secret` is the raw `X-Webhook-Secret` header value, if
    /// present. A `None` configured secret always authenticates —
    /// [`aether_config::OrchestratorConfig::validate`] is what turns an
    /// unset secret into a startup error in production, not this check.
    fn authenticate(&self, header_secret: Option<&str>) -> bool {
        let Some(expected) = &self.secret else { return true };
        let Some(provided) = header_secret else { return false };
        if provided.len() != expected.len() {
            return false;
        }
        bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
    }

    pub async fn dispatch(&self, header_secret: Option<&str>, event: WebhookEvent) -> WebhookOutcome {
        if !self.authenticate(header_secret) {
            return WebhookOutcome::Unauthorized;
        }

        match event.event_type.as_str() {
            "entity_registry_updated" => self.queue_registry_sync(),
            "mobile_app_notification_action" => self.apply_notification_action(&event).await,
            _ => self.dispatch_analyses(event).await,
        }
    }

    fn queue_registry_sync(&self) -> WebhookOutcome {
        let sync = Arc::clone(&self.registry_sync);
        tokio::spawn(async move {
            if let Err(e) = sync.sync().await {
                tracing::warn!(error = %e, "registry sync failed");
            }
        });
        WebhookOutcome::RegistrySyncQueued
    }

    async fn apply_notification_action(&self, event: &WebhookEvent) -> WebhookOutcome {
        let action = event.data.get("action").and_then(Value::as_str).unwrap_or_default();
        let (approve, id_part) = if let Some(rest) = action.strip_prefix("APPROVE_") {
            (true, rest)
        } else if let Some(rest) = action.strip_prefix("REJECT_") {
            (false, rest)
        } else {
            return WebhookOutcome::ProposalActionRejected {
                reason: format!("unrecognized notification action {action}"),
            };
        };

        let Ok(proposal_id) = Uuid::parse_str(id_part) else {
            return WebhookOutcome::ProposalActionRejected {
                reason: format!("malformed proposal id in action {action}"),
            };
        };

        let mut proposal = match self.proposals.get(proposal_id).await {
            Ok(p) => p,
            Err(e) => return WebhookOutcome::ProposalActionRejected { reason: e.to_string() },
        };

        let decision = if approve {
            proposal.approve("mobile_app_notification")
        } else {
            proposal.reject("declined via mobile notification")
        };
        if let Err(e) = decision {
            return WebhookOutcome::ProposalActionRejected { reason: e.to_string() };
        }
        proposal.review_notes.push(format!("action={action}"));

        if let Err(e) = self.proposals.update(proposal).await {
            return WebhookOutcome::ProposalActionRejected { reason: e.to_string() };
        }
        WebhookOutcome::ProposalDecisionApplied { proposal_id, approved: approve }
    }

    async fn dispatch_analyses(&self, event: WebhookEvent) -> WebhookOutcome {
        let enabled = self.schedules.list_enabled().await.unwrap_or_default();

        let matched: Vec<InsightSchedule> = enabled
            .into_iter()
            .filter(|s| s.trigger_kind == TriggerKind::Webhook)
            .filter(|s| match (&s.event_label, &event.webhook_event) {
                (None, _) => true,
                (Some(label), Some(got)) => label == got,
                (Some(_), None) => false,
            })
            .filter(|s| matches_filter(&s.match_filter, &event))
            .collect();

        if matched.is_empty() {
            return WebhookOutcome::NoMatch;
        }

        for schedule in matched.iter().cloned() {
            let schedule_id = schedule.id;
            let event = event.clone();
            let runner = Arc::clone(&self.analysis);
            let handle = tokio::spawn(async move { runner.run(&schedule, &event).await });
            // A second spawn isolates this schedule's panic/error logging from
            // the run itself: awaiting `handle` here never blocks or cancels
            // sibling matches, which already raced off in their own tasks.
            tokio::spawn(async move {
                match handle.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(schedule_id = %schedule_id, error = %e, "webhook-triggered analysis failed")
                    }
                    Err(e) => {
                        tracing::warn!(schedule_id = %schedule_id, error = %e, "webhook-triggered analysis task panicked")
                    }
                }
            });
        }

        WebhookOutcome::AnalysesQueued { matched: matched.len() }
    }
}

/// Evaluate a schedule's match-filter map against one inbound event (§6
/// "Match filter"). All present keys must match; absent keys are
/// wildcards; an empty filter matches everything.
pub fn matches_filter(filter: &HashMap<String, String>, event: &WebhookEvent) -> bool {
    if let Some(pattern) = filter.get("entity_id") {
        match &event.entity_id {
            Some(id) if glob_match(pattern, id) => {}
            _ => return false,
        }
    }
    if let Some(expected) = filter.get("event_type") {
        if &event.event_type != expected {
            return false;
        }
    }
    if let Some(expected) = filter.get("to_state") {
        if event.data.get("new_state").and_then(Value::as_str) != Some(expected.as_str()) {
            return false;
        }
    }
    if let Some(expected) = filter.get("from_state") {
        if event.data.get("old_state").and_then(Value::as_str) != Some(expected.as_str()) {
            return false;
        }
    }
    true
}

/// `*` matches any run of characters, `?` matches exactly one — the two
/// wildcards the match-filter table documents for `entity_id`.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn rec(p: &[u8], t: &[u8]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some(b'*'), _) => rec(&p[1..], t) || (!t.is_empty() && rec(p, &t[1..])),
            (Some(b'?'), Some(_)) => rec(&p[1..], &t[1..]),
            (Some(pc), Some(tc)) if pc == tc => rec(&p[1..], &t[1..]),
            _ => false,
        }
    }
    rec(pattern.as_bytes(), text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use aether_memory::{InMemoryStore, Proposal, ProposalKind, ProposalStatus, RepositoryFactory};

    fn event(event_type: &str) -> WebhookEvent {
        WebhookEvent { event_type: event_type.to_string(), entity_id: None, webhook_event: None, data: Value::Null }
    }

    #[test]
    fn glob_matches_wildcard_suffix() {
        assert!(glob_match("sensor.power*", "sensor.power_meter"));
        assert!(!glob_match("sensor.power*", "sensor.temperature"));
    }

    #[test]
    fn glob_matches_wildcard_prefix_and_wrap() {
        assert!(glob_match("*.kitchen", "light.kitchen"));
        assert!(glob_match("*kitchen*", "light.kitchen_lamp"));
    }

    #[test]
    fn glob_matches_single_char_wildcard() {
        assert!(glob_match("light.lamp?", "light.lamp1"));
        assert!(!glob_match("light.lamp?", "light.lamp12"));
    }

    #[test]
    fn glob_exact_match_has_no_wildcards() {
        assert!(glob_match("light.kitchen", "light.kitchen"));
        assert!(!glob_match("light.kitchen", "light.kitchen2"));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches_filter(&HashMap::new(), &event("state_changed")));
    }

    #[test]
    fn entity_id_filter_requires_payload_entity_id() {
        let mut filter = HashMap::new();
        filter.insert("entity_id".to_string(), "sensor.*".to_string());
        let mut e = event("state_changed");
        e.entity_id = None;
        assert!(!matches_filter(&filter, &e));
        e.entity_id = Some("sensor.power".to_string());
        assert!(matches_filter(&filter, &e));
    }

    #[test]
    fn to_state_and_from_state_are_exact() {
        let mut filter = HashMap::new();
        filter.insert("to_state".to_string(), "on".to_string());
        filter.insert("from_state".to_string(), "off".to_string());
        let mut e = event("state_changed");
        e.data = serde_json::json!({"old_state": "off", "new_state": "on"});
        assert!(matches_filter(&filter, &e));

        e.data = serde_json::json!({"old_state": "unavailable", "new_state": "on"});
        assert!(!matches_filter(&filter, &e));
    }

    struct CountingRegistrySync {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RegistrySync for CountingRegistrySync {
        async fn sync(&self) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RecordingAnalysisRunner {
        ran: Arc<std::sync::Mutex<Vec<Uuid>>>,
        fail_for: Option<Uuid>,
        panic_for: Option<Uuid>,
    }

    #[async_trait]
    impl AnalysisRunner for RecordingAnalysisRunner {
        async fn run(&self, schedule: &InsightSchedule, _event: &WebhookEvent) -> anyhow::Result<()> {
            if self.panic_for == Some(schedule.id) {
                panic!("simulated analysis panic");
            }
            if self.fail_for == Some(schedule.id) {
                anyhow::bail!("simulated analysis failure");
            }
            self.ran.lock().unwrap().push(schedule.id);
            Ok(())
        }
    }

    fn dispatcher(
        secret: Option<&str>,
        store: Arc<InMemoryStore>,
        registry_sync: Arc<dyn RegistrySync>,
        analysis: Arc<dyn AnalysisRunner>,
    ) -> WebhookDispatcher {
        WebhookDispatcher::new(
            secret.map(str::to_string),
            store.schedules(),
            store.proposals(),
            registry_sync,
            analysis,
        )
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let store = Arc::new(InMemoryStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(
            Some("correct-secret"),
            store,
            Arc::new(CountingRegistrySync { calls: calls.clone() }),
            Arc::new(RecordingAnalysisRunner { ran: Arc::default(), fail_for: None, panic_for: None }),
        );
        let outcome = d.dispatch(Some("wrong"), event("entity_registry_updated")).await;
        assert_eq!(outcome, WebhookOutcome::Unauthorized);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_secret_header_is_unauthorized_when_one_is_configured() {
        let store = Arc::new(InMemoryStore::new());
        let d = dispatcher(
            Some("correct-secret"),
            store,
            Arc::new(CountingRegistrySync { calls: Arc::default() }),
            Arc::new(RecordingAnalysisRunner { ran: Arc::default(), fail_for: None, panic_for: None }),
        );
        let outcome = d.dispatch(None, event("entity_registry_updated")).await;
        assert_eq!(outcome, WebhookOutcome::Unauthorized);
    }

    #[tokio::test]
    async fn no_configured_secret_always_authenticates() {
        let store = Arc::new(InMemoryStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(
            None,
            store,
            Arc::new(CountingRegistrySync { calls: calls.clone() }),
            Arc::new(RecordingAnalysisRunner { ran: Arc::default(), fail_for: None, panic_for: None }),
        );
        let outcome = d.dispatch(None, event("entity_registry_updated")).await;
        assert_eq!(outcome, WebhookOutcome::RegistrySyncQueued);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn approve_action_transitions_proposal() {
        let store = Arc::new(InMemoryStore::new());
        let mut proposal = Proposal::draft(ProposalKind::Automation, serde_json::json!({}), None);
        proposal.propose().unwrap();
        let proposal_id = proposal.id;
        store.proposals().create(proposal).await.unwrap();

        let d = dispatcher(
            None,
            store.clone(),
            Arc::new(CountingRegistrySync { calls: Arc::default() }),
            Arc::new(RecordingAnalysisRunner { ran: Arc::default(), fail_for: None, panic_for: None }),
        );

        let mut e = event("mobile_app_notification_action");
        e.data = serde_json::json!({"action": format!("APPROVE_{proposal_id}")});
        let outcome = d.dispatch(None, e).await;
        assert_eq!(outcome, WebhookOutcome::ProposalDecisionApplied { proposal_id, approved: true });

        let stored = store.proposals().get(proposal_id).await.unwrap();
        assert_eq!(stored.status, ProposalStatus::Approved);
    }

    #[tokio::test]
    async fn reject_action_on_unknown_proposal_is_rejected_not_panicking() {
        let store = Arc::new(InMemoryStore::new());
        let d = dispatcher(
            None,
            store,
            Arc::new(CountingRegistrySync { calls: Arc::default() }),
            Arc::new(RecordingAnalysisRunner { ran: Arc::default(), fail_for: None, panic_for: None }),
        );
        let mut e = event("mobile_app_notification_action");
        e.data = serde_json::json!({"action": format!("REJECT_{}", Uuid::new_v4())});
        let outcome = d.dispatch(None, e).await;
        assert!(matches!(outcome, WebhookOutcome::ProposalActionRejected { .. }));
    }

    #[tokio::test]
    async fn multiple_matching_schedules_all_queue_and_one_failure_does_not_affect_others() {
        let store = Arc::new(InMemoryStore::new());

        let mut ok_schedule = InsightSchedule::new_webhook("ok", "state_changed");
        ok_schedule.match_filter.insert("entity_id".to_string(), "sensor.*".to_string());
        let ok_id = ok_schedule.id;
        store.schedules().create(ok_schedule).await.unwrap();

        let mut failing_schedule = InsightSchedule::new_webhook("failing", "state_changed");
        failing_schedule.match_filter.insert("entity_id".to_string(), "sensor.*".to_string());
        let failing_id = failing_schedule.id;
        store.schedules().create(failing_schedule).await.unwrap();

        let mut panicking_schedule = InsightSchedule::new_webhook("panics", "state_changed");
        panicking_schedule.match_filter.insert("entity_id".to_string(), "sensor.*".to_string());
        let panicking_id = panicking_schedule.id;
        store.schedules().create(panicking_schedule).await.unwrap();

        let ran = Arc::new(std::sync::Mutex::new(Vec::new()));
        let analysis = Arc::new(RecordingAnalysisRunner {
            ran: ran.clone(),
            fail_for: Some(failing_id),
            panic_for: Some(panicking_id),
        });
        let d = dispatcher(None, store, Arc::new(CountingRegistrySync { calls: Arc::default() }), analysis);

        let mut e = event("state_changed");
        e.entity_id = Some("sensor.power".to_string());
        e.webhook_event = Some("state_changed".to_string());
        let outcome = d.dispatch(None, e).await;
        assert_eq!(outcome, WebhookOutcome::AnalysesQueued { matched: 3 });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ran.lock().unwrap().as_slice(), [ok_id]);
    }

    #[tokio::test]
    async fn non_matching_event_label_yields_no_match() {
        let store = Arc::new(InMemoryStore::new());
        store.schedules().create(InsightSchedule::new_webhook("label-only", "door_opened")).await.unwrap();

        let d = dispatcher(
            None,
            store,
            Arc::new(CountingRegistrySync { calls: Arc::default() }),
            Arc::new(RecordingAnalysisRunner { ran: Arc::default(), fail_for: None, panic_for: None }),
        );
        let outcome = d.dispatch(None, event("state_changed")).await;
        assert_eq!(outcome, WebhookOutcome::NoMatch);
    }
}
