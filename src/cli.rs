// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Minimal headless entry point for the orchestration core.
//!
//! The HTTP/SSE transport, settings loaders, and migration tooling that
//! front this crate in production are deliberately out of scope here —
//! this CLI exists only to drive one chat turn end to end for local
//! testing, the way `aether-core`'s own test suite drives it in-process.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "aether", about = "Home-automation agent orchestration core", version)]
pub struct Cli {
    /// The user message to send for this turn.
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Model name passed to the configured provider, e.g. "gpt-4o-mini".
    #[arg(long, short = 'm', default_value = "gpt-4o-mini", env = "AETHER_MODEL")]
    pub model: String,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.2)]
    pub temperature: f32,

    /// Increase verbosity (-v = debug, -vv = trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}
