//! CLI errors

use thiserror::Error;

use querygate_core::bridge::BridgeError;
use querygate_core::config::ConfigError;
use querygate_core::retrieval::RetrievalError;
use querygate_core::router::RouteError;
use querygate_core::tools::{RegistryError, StoreError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("Cannot read {path}: {message}")]
    Input { path: String, message: String },

    #[error("Unknown tool type '{0}' (expected SQL or API)")]
    UnknownKind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
