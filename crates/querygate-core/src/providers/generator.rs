//! Generator: the narrow text-generation interface the router and agent use

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions};
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage, StreamChunk, Tool, ToolCall};

/// Lazy sequence of text fragments
pub type TextStream = Pin<Box<dyn Stream<Item = ProviderResult<String>> + Send>>;

/// One assistant turn: any text plus the tool calls it asked for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatTurn {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

/// A provider bound to one model and sampling setup
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    temperature: Option<f32>,
    logger: Arc<dyn Logger>,
}

impl Generator {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            model,
            temperature: None,
            logger,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model.model
    }

    fn options(&self) -> StreamChatOptions {
        StreamChatOptions {
            temperature: self.temperature,
            ..Default::default()
        }
    }

    /// Stream the answer to a single prompt, text only
    pub async fn stream(&self, prompt: &str, cancel: CancellationToken) -> ProviderResult<TextStream> {
        let chunks = self
            .provider
            .stream_chat(
                vec![ChatMessage::user(prompt)],
                self.model.clone(),
                self.options(),
                cancel,
            )
            .await?;

        let text = chunks.filter_map(|item| async move {
            match item {
                Ok(StreamChunk::Text { text }) if text.is_empty() => None,
                Ok(StreamChunk::Text { text }) => Some(Ok(text)),
                Ok(StreamChunk::ToolCall { .. }) => None,
                Err(e) => Some(Err(e)),
            }
        });
        Ok(Box::pin(text))
    }

    /// Whole answer to a single prompt
    pub async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let mut stream = self.stream(prompt, CancellationToken::new()).await?;
        let mut out = String::new();
        while let Some(fragment) = stream.next().await {
            out.push_str(&fragment?);
        }
        Ok(out)
    }

    /// One chat turn with tools on offer
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        tools: Vec<Tool>,
        cancel: CancellationToken,
    ) -> ProviderResult<ChatTurn> {
        let options = if tools.is_empty() {
            self.options()
        } else {
            self.options().with_tools(tools)
        };

        let mut stream = self
            .provider
            .stream_chat(messages, self.model.clone(), options, cancel.clone())
            .await?;

        let mut turn = ChatTurn::default();
        while let Some(chunk) = stream.next().await {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            match chunk? {
                StreamChunk::Text { text } => turn.text.push_str(&text),
                StreamChunk::ToolCall { tool_call } => turn.tool_calls.push(tool_call),
            }
        }

        self.logger.debug(&format!(
            "[Generator] turn: {} chars, {} tool calls",
            turn.text.len(),
            turn.tool_calls.len()
        ));
        Ok(turn)
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.provider.name())
            .field("model", &self.model.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::providers::{MockProvider, MockTurn};
    use serde_json::json;

    fn generator(provider: MockProvider) -> Generator {
        Generator::new(
            Arc::new(provider),
            ProviderModelConfig::new("mock"),
            Arc::new(NoOpLogger::new()),
        )
    }

    #[tokio::test]
    async fn test_generate_collects_stream() {
        let gen = generator(MockProvider::chunked(
            vec!["Refunds ".into(), "take ".into(), "30 days.".into()],
            0,
            Arc::new(NoOpLogger::new()),
        ));
        assert_eq!(gen.generate("q").await.unwrap(), "Refunds take 30 days.");
    }

    #[tokio::test]
    async fn test_stream_yields_fragments() {
        let gen = generator(MockProvider::chunked(
            vec!["a".into(), "".into(), "b".into()],
            0,
            Arc::new(NoOpLogger::new()),
        ));
        let fragments: Vec<String> = gen
            .stream("q", CancellationToken::new())
            .await
            .unwrap()
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_chat_collects_tool_calls() {
        let gen = generator(MockProvider::scripted(
            vec![MockTurn {
                text: "Let me check.".into(),
                tool_calls: vec![ToolCall::new("c1", "weather", json!({"city": "Paris"}))],
            }],
            Arc::new(NoOpLogger::new()),
        ));
        let turn = gen
            .chat(vec![ChatMessage::user("weather?")], vec![], CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(turn.text, "Let me check.");
        assert_eq!(turn.tool_calls.len(), 1);
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let gen = generator(MockProvider::error("down", Arc::new(NoOpLogger::new())));
        assert!(gen.generate("q").await.is_err());
    }
}
