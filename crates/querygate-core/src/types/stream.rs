//! Streaming response types

use serde::{Deserialize, Serialize};
use super::tool::ToolCall;

/// Streaming chunk from a generator response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    Text {
        text: String,
    },
    /// Complete tool call
    ToolCall {
        #[serde(rename = "toolCall")]
        tool_call: ToolCall,
    },
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    pub fn tool_call(tool_call: ToolCall) -> Self {
        StreamChunk::ToolCall { tool_call }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            StreamChunk::ToolCall { tool_call } => Some(tool_call),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_accessors() {
        let chunk = StreamChunk::text("Hello");
        assert_eq!(chunk.as_text(), Some("Hello"));
        assert!(chunk.as_tool_call().is_none());

        let call = StreamChunk::tool_call(ToolCall::new("1", "weather", json!({"city": "NYC"})));
        assert!(call.as_text().is_none());
        assert_eq!(call.as_tool_call().map(|c| c.name.as_str()), Some("weather"));
    }

    #[test]
    fn test_chunk_serialization() {
        let json = serde_json::to_string(&StreamChunk::text("Hello world")).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"text\":\"Hello world\""));
    }
}
