// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! System prompt construction.
//!
//! One stable prompt per active agent — no dynamic/volatile blocks in this
//! domain (no git context, no CI context), so unlike the teacher there is
//! nothing that needs a separate uncached system block.

use aether_agents::AgentName;

/// Build the system message for `agent`, listing the tools currently
/// reachable by name (already filtered to this turn's registry).
pub fn system_prompt(agent: AgentName, tool_names: &[String]) -> String {
    let role = role_description(agent);
    let mut tools = tool_names.to_vec();
    tools.sort();

    let mut prompt = format!(
        "You are the {} of a home-automation assistant.\n\n{}\n\n",
        agent.as_str(),
        role
    );

    prompt.push_str(
        "Tools that change anything in the house (automations, entity \
         commands, scripts, scenes) are never executed directly. Call \
         `seek_approval` with the proposed change instead and wait for a \
         human to approve it before assuming it has taken effect.\n\n",
    );

    if !tools.is_empty() {
        prompt.push_str("Available tools:\n");
        for name in &tools {
            prompt.push_str("- ");
            prompt.push_str(name);
            prompt.push('\n');
        }
    }

    prompt
}

fn role_description(agent: AgentName) -> &'static str {
    match agent {
        AgentName::Architect => {
            "You handle general conversation and home-automation questions, \
             deciding when to delegate to a specialist and when to answer \
             directly."
        }
        AgentName::DataScienceTeam => {
            "You investigate entity behavior, run diagnostic analyses, and \
             file insights when something looks wrong."
        }
        AgentName::Librarian => "You discover and describe entities, automations, and scenes.",
        AgentName::Developer => "You handle deployment of approved changes.",
        AgentName::System => "You handle approvals and scheduling on behalf of the user.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_the_agents_own_role() {
        let prompt = system_prompt(AgentName::Librarian, &[]);
        assert!(prompt.contains("librarian"));
        assert!(prompt.contains("discover"));
    }

    #[test]
    fn lists_tools_sorted() {
        let prompt = system_prompt(
            AgentName::Architect,
            &["get_entity_state".to_string(), "discover_entities".to_string()],
        );
        let discover_pos = prompt.find("discover_entities").unwrap();
        let state_pos = prompt.find("get_entity_state").unwrap();
        assert!(discover_pos < state_pos);
    }

    #[test]
    fn always_mentions_approval_gate() {
        let prompt = system_prompt(AgentName::Architect, &[]);
        assert!(prompt.contains("seek_approval"));
    }

    #[test]
    fn every_agent_has_a_distinct_role_line() {
        for agent in [
            AgentName::Architect,
            AgentName::DataScienceTeam,
            AgentName::Librarian,
            AgentName::Developer,
            AgentName::System,
        ] {
            assert!(!role_description(agent).is_empty());
        }
    }
}
