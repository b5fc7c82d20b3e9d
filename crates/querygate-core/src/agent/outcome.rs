//! What an agent run produced

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tool invocation made during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub name: String,
    pub args: Value,
    pub output: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// Final assistant message
    pub answer: String,
    pub trace: Vec<TraceEntry>,
}

impl AgentOutcome {
    /// Whether any answer was grounded in a tool result
    pub fn used_tools(&self) -> bool {
        self.trace.iter().any(|entry| !entry.failed)
    }

    /// Output of the last call that succeeded
    pub fn last_output(&self) -> Option<&str> {
        self.trace
            .iter()
            .rev()
            .find(|entry| !entry.failed)
            .map(|entry| entry.output.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] crate::providers::ProviderError),

    #[error(transparent)]
    Bridge(#[from] crate::bridge::BridgeError),
}

pub type AgentResult<T> = Result<T, AgentError>;
