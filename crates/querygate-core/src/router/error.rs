//! Router errors
//!
//! Inside the fragment stream every one of these becomes a single
//! `Fragment::Error`.

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::invoker::InvokeError;
use crate::retrieval::RetrievalError;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Tool '{tool}' takes {expected} argument(s), got {got}")]
    ParameterCount {
        tool: String,
        expected: usize,
        got: usize,
    },

    #[error("Tool does not exist: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    ParameterType(InvokeError),

    #[error(transparent)]
    Invoke(InvokeError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Generation failed: {0}")]
    UpstreamGeneration(String),

    #[error("Tool bridge failed: {0}")]
    Bridge(#[from] BridgeError),
}

impl From<InvokeError> for RouteError {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::ParameterType { .. } | InvokeError::MissingArgument { .. } => {
                RouteError::ParameterType(err)
            }
            other => RouteError::Invoke(other),
        }
    }
}

impl From<crate::providers::ProviderError> for RouteError {
    fn from(err: crate::providers::ProviderError) -> Self {
        RouteError::UpstreamGeneration(err.to_string())
    }
}

impl From<crate::agent::AgentError> for RouteError {
    fn from(err: crate::agent::AgentError) -> Self {
        match err {
            crate::agent::AgentError::Provider(e) => e.into(),
            crate::agent::AgentError::Bridge(e) => RouteError::Bridge(e),
        }
    }
}

pub type RouteResult<T> = Result<T, RouteError>;
