// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The `AppSettings` singleton: four mutable sections, each validated and
//! clamped against compiled-in defaults, with a 30-second read-through
//! cache invalidated on every write.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown settings section: {0}")]
    UnknownSection(String),
    #[error("{key} must be a boolean")]
    NotABoolean { key: String },
    #[error("{key} must be a number")]
    NotANumber { key: String },
    #[error("{key} must be one of {allowed:?}")]
    InvalidEnum { key: String, allowed: Vec<&'static str> },
    #[error("{key} must be a time string in HH:MM format or null")]
    InvalidTime { key: String },
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

impl Impact {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// `chat` section. Bounds mirror the original dataclass defaults exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub stream_timeout_seconds: i64,
    pub tool_timeout_seconds: i64,
    pub analysis_tool_timeout_seconds: i64,
    pub max_tool_iterations: i64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            stream_timeout_seconds: 900,
            tool_timeout_seconds: 30,
            analysis_tool_timeout_seconds: 180,
            max_tool_iterations: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub default_refresh_interval_seconds: i64,
    pub max_widgets: i64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self { default_refresh_interval_seconds: 60, max_widgets: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataScienceSettings {
    pub sandbox_enabled: bool,
    pub sandbox_timeout_quick: i64,
    pub sandbox_timeout_standard: i64,
    pub sandbox_timeout_deep: i64,
    pub sandbox_memory_quick: i64,
    pub sandbox_memory_standard: i64,
    pub sandbox_memory_deep: i64,
    pub sandbox_artifacts_enabled: bool,
}

impl Default for DataScienceSettings {
    fn default() -> Self {
        Self {
            sandbox_enabled: true,
            sandbox_timeout_quick: 30,
            sandbox_timeout_standard: 60,
            sandbox_timeout_deep: 180,
            sandbox_memory_quick: 512,
            sandbox_memory_standard: 1024,
            sandbox_memory_deep: 2048,
            sandbox_artifacts_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSettings {
    pub enabled: bool,
    pub min_impact: String,
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
}

impl Default for NotificationsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_impact: "high".to_string(),
            quiet_hours_start: None,
            quiet_hours_end: None,
        }
    }
}

impl NotificationsSettings {
    pub fn min_impact(&self) -> Impact {
        Impact::parse(&self.min_impact).unwrap_or(Impact::High)
    }
}

/// One of the four mutable `AppSettings` sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    Chat,
    Dashboard,
    DataScience,
    Notifications,
}

impl SettingsSection {
    fn name(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Dashboard => "dashboard",
            Self::DataScience => "data_science",
            Self::Notifications => "notifications",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chat" => Some(Self::Chat),
            "dashboard" => Some(Self::Dashboard),
            "data_science" => Some(Self::DataScience),
            "notifications" => Some(Self::Notifications),
            _ => None,
        }
    }
}

/// (min, max) inclusive bounds per numeric key. Absent key = no bound.
fn field_bounds(key: &str) -> Option<(i64, i64)> {
    match key {
        "stream_timeout_seconds" => Some((60, 3600)),
        "tool_timeout_seconds" => Some((5, 300)),
        "analysis_tool_timeout_seconds" => Some((30, 600)),
        "max_tool_iterations" => Some((1, 50)),
        "default_refresh_interval_seconds" => Some((10, 3600)),
        "max_widgets" => Some((1, 100)),
        "sandbox_timeout_quick" => Some((5, 120)),
        "sandbox_timeout_standard" => Some((10, 300)),
        "sandbox_timeout_deep" => Some((30, 600)),
        "sandbox_memory_quick" => Some((128, 2048)),
        "sandbox_memory_standard" => Some((256, 4096)),
        "sandbox_memory_deep" => Some((512, 8192)),
        _ => None,
    }
}

fn clamp(key: &str, v: i64) -> i64 {
    match field_bounds(key) {
        Some((lo, hi)) => v.clamp(lo, hi),
        None => v,
    }
}

fn is_valid_time(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else { return false };
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return false;
    }
    matches!((h.parse::<u32>(), m.parse::<u32>()), (Ok(hh), Ok(mm)) if hh < 24 && mm < 60)
}

/// Validate and clamp a patch for a single section. Unknown keys are
/// silently dropped, exactly as the original `validate_section` does —
/// callers PATCHing a subset of keys must not be rejected for typos in
/// keys they didn't intend to touch alongside valid ones elsewhere.
pub fn validate_section(
    section: SettingsSection,
    patch: &serde_json::Map<String, serde_json::Value>,
) -> Result<serde_json::Map<String, serde_json::Value>, SettingsError> {
    use serde_json::Value;

    let defaults = section_defaults_json(section);
    let mut validated = serde_json::Map::new();

    for (key, value) in patch {
        let Some(expected) = defaults.get(key) else { continue };

        match expected {
            Value::Bool(_) => {
                let Value::Bool(b) = value else {
                    return Err(SettingsError::NotABoolean { key: key.clone() });
                };
                validated.insert(key.clone(), Value::Bool(*b));
            }
            Value::Number(_) => {
                let iv = match value {
                    Value::Number(n) if n.is_i64() => n.as_i64().unwrap(),
                    Value::Number(n) if n.is_f64() => n.as_f64().unwrap() as i64,
                    Value::Number(n) if n.is_u64() => n.as_u64().unwrap() as i64,
                    _ => return Err(SettingsError::NotANumber { key: key.clone() }),
                };
                validated.insert(key.clone(), Value::from(clamp(key, iv)));
            }
            _ if key == "min_impact" => {
                let Value::String(s) = value else {
                    return Err(SettingsError::InvalidEnum {
                        key: key.clone(),
                        allowed: vec!["low", "medium", "high", "critical"],
                    });
                };
                if Impact::parse(s).is_none() {
                    return Err(SettingsError::InvalidEnum {
                        key: key.clone(),
                        allowed: vec!["low", "medium", "high", "critical"],
                    });
                }
                validated.insert(key.clone(), Value::String(s.clone()));
            }
            _ if key == "quiet_hours_start" || key == "quiet_hours_end" => match value {
                Value::Null => {
                    validated.insert(key.clone(), Value::Null);
                }
                Value::String(s) if is_valid_time(s) => {
                    validated.insert(key.clone(), Value::String(s.clone()));
                }
                _ => return Err(SettingsError::InvalidTime { key: key.clone() }),
            },
            _ => {
                validated.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(validated)
}

fn section_defaults_json(section: SettingsSection) -> serde_json::Value {
    match section {
        SettingsSection::Chat => serde_json::to_value(ChatSettings::default()).unwrap(),
        SettingsSection::Dashboard => serde_json::to_value(DashboardSettings::default()).unwrap(),
        SettingsSection::DataScience => {
            serde_json::to_value(DataScienceSettings::default()).unwrap()
        }
        SettingsSection::Notifications => {
            serde_json::to_value(NotificationsSettings::default()).unwrap()
        }
    }
}

/// The merged, defaults-applied view of all four sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSettings {
    pub chat: ChatSettings,
    pub dashboard: DashboardSettings,
    pub data_science: DataScienceSettings,
    pub notifications: NotificationsSettings,
}

/// Process-wide 30-second read cache, generalizing the teacher's
/// `Shared<T>` live-refreshable-snapshot pattern to a timestamped value.
/// `get_or_refresh` performs one DB round-trip only when the cache is
/// empty or stale; `invalidate` is called on every write, per §3's
/// "writes merge; reads always return defaults-merged-with-overrides".
pub struct SettingsCache {
    inner: RwLock<Option<(Instant, MergedSettings)>>,
    ttl: Duration,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        Self { inner: RwLock::new(None), ttl }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(30))
    }

    /// Return the cached value if still fresh.
    pub fn get(&self) -> Option<MergedSettings> {
        let guard = self.inner.read().expect("settings cache lock poisoned");
        guard
            .as_ref()
            .filter(|(ts, _)| ts.elapsed() < self.ttl)
            .map(|(_, v)| v.clone())
    }

    /// Overwrite the cache with a freshly-loaded value.
    pub fn set(&self, value: MergedSettings) {
        *self.inner.write().expect("settings cache lock poisoned") = Some((Instant::now(), value));
    }

    /// Clear the cache; the next `get` returns `None`, forcing a reload.
    pub fn invalidate(&self) {
        *self.inner.write().expect("settings cache lock poisoned") = None;
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}
