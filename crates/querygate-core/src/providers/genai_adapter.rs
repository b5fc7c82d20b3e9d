//! Conversions between querygate types and `genai` types, plus client setup
//!
//! Credentials are resolved by querygate (config, env, keychain) before the
//! client is built; genai's own env lookup is bypassed.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions,
    ChatStreamEvent, MessageContent as GenaiContent, Tool as GenaiTool,
    ToolCall as GenaiToolCall,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};

use super::traits::StreamChatOptions;
use crate::types::{ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolCall};

/// Flatten one part to text; tool traffic is replayed as a readable transcript
fn part_text(part: ContentPart) -> String {
    match part {
        ContentPart::Text { text } => text,
        ContentPart::ToolUse { name, input, .. } => format!("[Called tool {} with {}]", name, input),
        ContentPart::ToolResult {
            tool_use_id,
            content,
        } => format!("[Tool result for {}]: {}", tool_use_id, content),
    }
}

pub fn to_genai_message(msg: ChatMessage) -> GenaiMessage {
    let content = match msg.content {
        MessageContent::Text(text) => GenaiContent::from(text),
        MessageContent::Parts(parts) => GenaiContent::from(
            parts
                .into_iter()
                .map(part_text)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    };

    match msg.role {
        MessageRole::System => GenaiMessage::system(content),
        MessageRole::User => GenaiMessage::user(content),
        MessageRole::Assistant => GenaiMessage::assistant(content),
    }
}

pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().map(to_genai_message).collect()
}

pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);
    match tool.input_schema {
        Some(schema) => genai_tool.with_schema(schema),
        None => genai_tool,
    }
}

pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();
    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }
    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }
    // Tool calls are emitted once, complete, at the end of the stream
    genai_opts.with_capture_tool_calls(true)
}

pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone())
}

/// Text chunks pass through; the end event yields every captured tool call
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<StreamChunk> {
    match event {
        ChatStreamEvent::Chunk(chunk) => vec![StreamChunk::text(chunk.content)],
        ChatStreamEvent::End(end) => end
            .captured_tool_calls()
            .map(|calls| {
                calls
                    .iter()
                    .map(|tc| StreamChunk::tool_call(from_genai_tool_call(tc)))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Provider id from a prefixed model string (`openai/gpt-4o` -> `openai`)
pub fn extract_provider(model: &str) -> Option<&str> {
    model.split_once('/').map(|(provider, _)| provider)
}

/// Model name without its provider prefix
pub fn extract_model_name(model: &str) -> &str {
    model.split_once('/').map(|(_, name)| name).unwrap_or(model)
}

pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Native providers plus OpenAI-compatible endpoints
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider) || matches!(provider.to_lowercase().as_str(), "openrouter" | "mistral")
}

/// Build a genai client for one provider
///
/// `api_key` is the already resolved credential (none for local models).
/// `api_base` overrides the endpoint and speaks the OpenAI protocol unless the
/// provider is native.
pub fn create_client(provider: &str, api_key: Option<String>, api_base: Option<String>) -> Client {
    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = api_key.clone();
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        },
    );

    let target_provider = provider.to_lowercase();
    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let (endpoint, adapter_kind) = match (target_provider.as_str(), api_base.as_ref()) {
                ("openrouter", None) => (
                    Endpoint::from_static("https://openrouter.ai/api/v1/"),
                    AdapterKind::OpenAI,
                ),
                ("mistral", None) => (
                    Endpoint::from_static("https://api.mistral.ai/v1/"),
                    AdapterKind::OpenAI,
                ),
                (_, Some(base)) => {
                    let kind = if is_genai_native(&target_provider) {
                        target.model.adapter_kind
                    } else {
                        AdapterKind::OpenAI
                    };
                    (Endpoint::from_owned(base.clone()), kind)
                }
                _ => return Ok(target),
            };

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model: ModelIden::new(adapter_kind, target.model.model_name.clone()),
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}
