// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Concrete tool implementations available to the architect's
//! tool-calling loop.

pub mod approval;
pub mod automations;
pub mod config;
pub mod data_science;
pub mod domain_summary;
pub mod entities_by_domain;
pub mod entity_state;
pub mod logs;
pub mod schedule;
pub mod search;
pub mod template;
