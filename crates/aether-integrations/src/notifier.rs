// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Gates push notifications on quiet hours and a minimum impact
//! threshold, then collapses multiple qualifying insights into a single
//! aggregate notification.

use async_trait::async_trait;
use chrono::NaiveTime;
use tracing::error;
use uuid::Uuid;

use aether_config::{Impact, NotificationsSettings};
use aether_memory::{ImpactLevel, Insight};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Single { insight_id: Uuid },
    Aggregate { count: usize },
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: Notification) -> anyhow::Result<()>;
}

fn impact_rank(level: ImpactLevel) -> u8 {
    match level {
        ImpactLevel::Low => 0,
        ImpactLevel::Medium => 1,
        ImpactLevel::High => 2,
        ImpactLevel::Critical => 3,
    }
}

fn threshold_rank(impact: Impact) -> u8 {
    match impact {
        Impact::Low => 0,
        Impact::Medium => 1,
        Impact::High => 2,
        Impact::Critical => 3,
    }
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

/// Wraparound-aware: `start=22:00, end=07:00, now=23:30` is quiet; the
/// interval is read as "quiet from start until end, crossing midnight if
/// start > end".
pub fn is_quiet_hours(settings: &NotificationsSettings, now: NaiveTime) -> bool {
    let (Some(start), Some(end)) = (
        settings.quiet_hours_start.as_deref().and_then(parse_hhmm),
        settings.quiet_hours_end.as_deref().and_then(parse_hhmm),
    ) else {
        return false;
    };

    if start <= end {
        now >= start && now <= end
    } else {
        now >= start || now <= end
    }
}

pub struct InsightNotifier;

impl InsightNotifier {
    /// Filters `insights` by `impact >= min_impact`, respects quiet hours
    /// and the `enabled` flag, and sends at most one notification: a
    /// per-insight one if exactly one insight qualifies, an aggregate
    /// otherwise. Sink failures are logged and swallowed — this never
    /// blocks the analysis pipeline that called it.
    pub async fn notify(
        &self,
        settings: &NotificationsSettings,
        insights: &[Insight],
        now: NaiveTime,
        sink: &dyn NotificationSink,
    ) {
        if !settings.enabled {
            return;
        }
        if is_quiet_hours(settings, now) {
            return;
        }

        let threshold = threshold_rank(settings.min_impact());
        let matching: Vec<&Insight> =
            insights.iter().filter(|i| impact_rank(i.impact) >= threshold).collect();

        let notification = match matching.as_slice() {
            [] => return,
            [only] => Notification::Single { insight_id: only.id },
            many => Notification::Aggregate { count: many.len() },
        };

        if let Err(err) = sink.send(notification).await {
            error!(error = %err, "insight notification failed, swallowing");
        }
    }
}
