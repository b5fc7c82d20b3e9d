//! Invoker error types

use serde_json::{json, Value};
use thiserror::Error;

/// Errors from one tool invocation
///
/// None of these are fatal to the caller; the router renders them as an error
/// fragment and the bridge as an error tool result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("Missing required argument '{param}'")]
    MissingArgument { param: String },

    #[error("Argument '{param}' is not a valid {expected}: {value}")]
    ParameterType {
        param: String,
        expected: String,
        value: String,
    },

    #[error("Tool call timed out: {0}")]
    Timeout(String),

    #[error("Tool call failed: {0}")]
    Transport(String),

    #[error("Unsupported Content-Type: {0}")]
    UnsupportedContentType(String),

    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl InvokeError {
    pub fn missing(param: impl Into<String>) -> Self {
        Self::MissingArgument {
            param: param.into(),
        }
    }

    pub fn parameter_type(
        param: impl Into<String>,
        expected: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ParameterType {
            param: param.into(),
            expected: expected.into(),
            value: value.into(),
        }
    }

    /// `{"error": "<message>"}`
    pub fn to_error_value(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<reqwest::Error> for InvokeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InvokeError::Timeout(e.to_string())
        } else if e.is_decode() {
            InvokeError::Decode(e.to_string())
        } else {
            InvokeError::Transport(e.to_string())
        }
    }
}

pub type InvokeResult<T> = Result<T, InvokeError>;
