//! Provider trait definition

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::error::ProviderResult;
use crate::types::{CancellationToken, ChatMessage, StreamChunk, Tool};

/// Model selection and credentials for one request
#[derive(Debug, Clone, Default)]
pub struct ProviderModelConfig {
    /// Model id, optionally prefixed with the provider (`ollama/qwen2.5:1.5b`)
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

impl ProviderModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreamChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Tools the model may call this turn
    pub tools: Option<Vec<Tool>>,
}

impl StreamChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }
}

pub type StreamResponse = Pin<Box<dyn Stream<Item = ProviderResult<StreamChunk>> + Send>>;

/// A text generation backend
///
/// The generation algorithm is opaque; querygate only needs a streamed chat
/// completion that may end with tool calls.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider id (`openai`, `ollama`, `mock`, ...)
    fn name(&self) -> &str;

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse>;
}
