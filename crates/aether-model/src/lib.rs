// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
pub mod catalog;
pub(crate) mod openai_compat;
mod types;
mod provider;
mod openai;
mod mock;

pub use catalog::ModelCatalogEntry;
pub use mock::{MockProvider, ScriptedMockProvider};
pub use openai::OpenAiProvider;
pub use provider::ModelProvider;
pub use types::*;

/// Build the one concrete [`ModelProvider`] this crate ships, reading
/// credentials from the environment the way the rest of the stack expects
/// (see `aether-config`'s `OrchestratorConfig::from_env` for the sibling
/// pattern). The LLM provider itself is an external collaborator — the
/// orchestrator only ever depends on `Arc<dyn ModelProvider>`, so swapping
/// in another OpenAI-compatible endpoint is a matter of `base_url`/
/// `api_key_env`, not a new driver.
pub fn openai_from_env(model_name: impl Into<String>) -> OpenAiProvider {
    let model_name = model_name.into();
    let api_key = std::env::var("OPENAI_API_KEY").ok();
    let base_url = std::env::var("OPENAI_BASE_URL").ok();
    let max_tokens = catalog::lookup("openai", &model_name).map(|e| e.max_output_tokens);
    OpenAiProvider::new(model_name, api_key, base_url, max_tokens, None, serde_json::json!({}))
}
