//! Bridge errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to spawn bridge process: {0}")]
    Spawn(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Tool call failed: {0}")]
    ToolCall(String),

    #[error("Bridge timed out after {0} ms")]
    Timeout(u64),

    #[error("Session is {state}, cannot {operation}")]
    InvalidState {
        state: &'static str,
        operation: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
