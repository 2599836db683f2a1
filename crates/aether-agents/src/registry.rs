// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The fixed agent roster. Agents are a closed set named by role, not a
//! dynamically-registered plugin system — new agents are added here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Architect,
    DataScienceTeam,
    Librarian,
    Developer,
    System,
}

impl AgentName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Architect => "architect",
            Self::DataScienceTeam => "data_science_team",
            Self::Librarian => "librarian",
            Self::Developer => "developer",
            Self::System => "system",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "architect" => Some(Self::Architect),
            "data_science_team" => Some(Self::DataScienceTeam),
            "librarian" => Some(Self::Librarian),
            "developer" => Some(Self::Developer),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Agent {
    pub name: AgentName,
    pub skills: &'static [&'static str],
    /// The architect is the universal fallback; all other agents can be
    /// disabled by preset or disabled-set, the architect never can.
    pub always_available: bool,
}

pub const AGENTS: &[Agent] = &[
    Agent {
        name: AgentName::Architect,
        skills: &["general_chat", "design", "home_automation_query"],
        always_available: true,
    },
    Agent {
        name: AgentName::DataScienceTeam,
        skills: &["analysis", "diagnosis"],
        always_available: false,
    },
    Agent {
        name: AgentName::Librarian,
        skills: &["entity_discovery"],
        always_available: false,
    },
    Agent {
        name: AgentName::Developer,
        skills: &["deployment"],
        always_available: false,
    },
    Agent {
        name: AgentName::System,
        skills: &["approval", "scheduling"],
        always_available: false,
    },
];

pub fn find(name: AgentName) -> &'static Agent {
    AGENTS.iter().find(|a| a.name == name).expect("AGENTS covers every AgentName variant")
}
