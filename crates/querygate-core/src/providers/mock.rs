//! Mock provider for testing
//!
//! Deterministic responses without network access: echo, fixed text, explicit
//! chunks, errors, and scripted multi-turn conversations with tool calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage, MessageContent, MessageRole, StreamChunk, ToolCall};

/// One scripted assistant turn
#[derive(Debug, Clone, Default)]
pub struct MockTurn {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

impl MockTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: String::new(),
            tool_calls,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    Fixed(String),
    /// Exactly these chunks
    Chunks(Vec<String>),
    /// `delay_chunks` chunks, then an error
    Error { message: String, delay_chunks: usize },
    Empty,
    /// One turn per request, in order; the last turn repeats
    Script(Vec<MockTurn>),
}

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub mode: MockMode,
    /// Delay between chunks (0 = none)
    pub chunk_delay_ms: u64,
    /// Split size for echo/fixed responses
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Echo,
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

pub struct MockProvider {
    config: MockConfig,
    turn: AtomicUsize,
    /// Message lists of every request, for assertions
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            turn: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode,
                ..Default::default()
            },
            logger,
        )
    }

    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    pub fn chunked(chunks: Vec<String>, delay_ms: u64, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Chunks(chunks), logger).with_delay(delay_ms)
    }

    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(
            MockMode::Error {
                message: message.into(),
                delay_chunks: 0,
            },
            logger,
        )
    }

    pub fn scripted(turns: Vec<MockTurn>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(turns), logger)
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }

    fn last_user_text(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .find_map(|m| match &m.content {
                MessageContent::Text(text) if !text.is_empty() => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }

    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if self.config.chunk_size == 0 || text.is_empty() {
            return vec![text.to_string()];
        }
        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn next_turn(&self, turns: &[MockTurn]) -> MockTurn {
        let index = self.turn.fetch_add(1, Ordering::SeqCst);
        turns
            .get(index)
            .or_else(|| turns.last())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        _options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let items: Vec<ProviderResult<StreamChunk>> = match &self.config.mode {
            MockMode::Echo => self
                .split_into_chunks(&format!("Echo: {}", Self::last_user_text(&messages)))
                .into_iter()
                .map(|c| Ok(StreamChunk::text(c)))
                .collect(),
            MockMode::Fixed(response) => self
                .split_into_chunks(response)
                .into_iter()
                .map(|c| Ok(StreamChunk::text(c)))
                .collect(),
            MockMode::Chunks(chunks) => chunks.iter().map(|c| Ok(StreamChunk::text(c))).collect(),
            MockMode::Empty => Vec::new(),
            MockMode::Error {
                message,
                delay_chunks,
            } => (0..*delay_chunks)
                .map(|i| Ok(StreamChunk::text(format!("Chunk {} before error. ", i))))
                .chain(std::iter::once(Err(ProviderError::Other(format!(
                    "Mock error: {}",
                    message
                )))))
                .collect(),
            MockMode::Script(turns) => {
                let turn = self.next_turn(turns);
                let mut items = Vec::new();
                if !turn.text.is_empty() {
                    items.push(Ok(StreamChunk::text(turn.text)));
                }
                items.extend(turn.tool_calls.into_iter().map(|c| Ok(StreamChunk::tool_call(c))));
                items
            }
        };

        self.logger.debug(&format!(
            "[MockProvider] stream_chat: {} items",
            items.len()
        ));
        self.requests.lock().push(messages);

        let delay_ms = self.config.chunk_delay_ms;
        let stream = stream::iter(items.into_iter().enumerate()).then(move |(i, item)| {
            let cancel = cancel_token.clone();
            async move {
                if i > 0 && delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                item
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn collect_text(provider: &MockProvider, prompt: &str) -> ProviderResult<String> {
        let mut stream = provider
            .stream_chat(
                vec![ChatMessage::user(prompt)],
                ProviderModelConfig::new("mock"),
                StreamChatOptions::default(),
                CancellationToken::new(),
            )
            .await?;
        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            if let Some(text) = chunk?.as_text() {
                out.push_str(text);
            }
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::echo(test_logger());
        assert_eq!(collect_text(&provider, "Hello, world!").await.unwrap(), "Echo: Hello, world!");
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_fixed_and_chunked_modes() {
        let provider = MockProvider::fixed("This is a test response.", test_logger());
        assert_eq!(collect_text(&provider, "x").await.unwrap(), "This is a test response.");

        let provider = MockProvider::chunked(vec!["a".into(), "b".into()], 0, test_logger());
        assert_eq!(collect_text(&provider, "x").await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn test_error_mode() {
        let provider = MockProvider::error("boom", test_logger());
        let err = collect_text(&provider, "x").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_script_mode_advances_and_repeats_last() {
        let provider = MockProvider::scripted(
            vec![
                MockTurn::calls(vec![ToolCall::new("c1", "weather", json!({"city": "Paris"}))]),
                MockTurn::text("It is 20 degrees."),
            ],
            test_logger(),
        );

        let mut first = provider
            .stream_chat(
                vec![ChatMessage::user("weather?")],
                ProviderModelConfig::new("mock"),
                StreamChatOptions::default(),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        let chunk = first.next().await.unwrap().unwrap();
        assert_eq!(chunk.as_tool_call().map(|c| c.name.as_str()), Some("weather"));
        assert!(first.next().await.is_none());

        assert_eq!(collect_text(&provider, "x").await.unwrap(), "It is 20 degrees.");
        assert_eq!(collect_text(&provider, "x").await.unwrap(), "It is 20 degrees.");
    }

    #[tokio::test]
    async fn test_cancellation() {
        let provider = MockProvider::fixed("Long response that gets cancelled", test_logger())
            .with_delay(20);
        let cancel = CancellationToken::new();
        let mut stream = provider
            .stream_chat(
                vec![ChatMessage::user("x")],
                ProviderModelConfig::new("mock"),
                StreamChatOptions::default(),
                cancel.clone(),
            )
            .await
            .unwrap();

        assert!(stream.next().await.unwrap().is_ok());
        cancel.cancel();
        assert!(matches!(stream.next().await, Some(Err(ProviderError::Cancelled))));
    }

    #[test]
    fn test_chunk_splitting() {
        let provider = MockProvider::echo(test_logger()).with_chunk_size(5);
        assert_eq!(provider.split_into_chunks("Hello, world!"), vec!["Hello", ", wor", "ld!"]);
    }
}
