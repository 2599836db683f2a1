// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Environment configuration and the `AppSettings` schema.
//!
//! Two distinct configuration surfaces live here, mirroring the split
//! between process-wide environment configuration and the mutable,
//! DB-backed settings singleton:
//!
//! - [`OrchestratorConfig`] is read once from the environment at process
//!   startup and never changes for the lifetime of the process.
//! - [`AppSettings`] sections are validated, clamped, merged with
//!   compiled-in defaults, and cached for 30 seconds by the caller
//!   (see [`SettingsCache`]).
mod env;
mod settings;

pub use env::{DeploymentMode, OrchestratorConfig, ProcessRole};
pub use settings::{
    validate_section, ChatSettings, DashboardSettings, DataScienceSettings, Impact,
    MergedSettings, NotificationsSettings, SettingsCache, SettingsError, SettingsSection,
};
