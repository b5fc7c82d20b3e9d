//! Generator backends
//!
//! All real providers go through the `genai` crate, which handles streaming,
//! provider protocols and tool calling. OpenAI-compatible endpoints
//! (OpenRouter, Mistral, a custom `api_base`) are routed through genai's
//! `ServiceTargetResolver`. Credentials come from querygate's secret chain.
//!
//! `MockProvider` backs the tests.

mod error;
mod generator;
mod genai_adapter;
mod genai_provider;
mod mock;
mod traits;

use std::sync::Arc;

pub use error::{ProviderError, ProviderResult};
pub use generator::{ChatTurn, Generator, TextStream};
pub use genai_adapter::{extract_model_name, extract_provider, is_genai_native, is_genai_supported};
pub use genai_provider::GenaiProvider;
pub use mock::{MockConfig, MockMode, MockProvider, MockTurn};
pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

use crate::logging::Logger;
use crate::secrets::SecretStore;

/// Provider for an id; unknown ids are treated as OpenAI-compatible endpoints
pub fn create_provider(
    provider_id: &str,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        id => {
            if !GenaiProvider::supports(id) {
                logger.warn(&format!(
                    "[providers] '{}' is not a known provider, using the OpenAI protocol",
                    id
                ));
            }
            Arc::new(GenaiProvider::new(id, secrets, logger))
        }
    }
}

pub fn supported_providers() -> Vec<&'static str> {
    vec![
        "openai",
        "anthropic",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        "openrouter",
        "mistral",
        "mock",
    ]
}
