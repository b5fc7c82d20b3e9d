//! querygate core
//!
//! Answers a free-text query with one of three strategies, in priority order:
//!
//! 1. a literal call to a registered HTTP tool (`weather:Paris`)
//! 2. a grounded answer over documents that clear the retrieval threshold
//! 3. an agent fallback that reaches the tools through a per-query MCP bridge
//!
//! ```rust,ignore
//! use querygate_core::{QueryRouter, RouterSettings, ToolRegistry};
//!
//! let registry = Arc::new(ToolRegistry::load(store, ValidationMode::Lenient, logger.clone()).await?);
//! let router = QueryRouter::new(registry, retriever, generator, sessions, settings, logger)?;
//!
//! let mut answer = router.route("weather:Paris");
//! while let Some(fragment) = answer.next().await {
//!     print!("{}", fragment);
//! }
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod secrets;
pub mod providers;
pub mod tools;
pub mod invoker;
pub mod retrieval;
pub mod bridge;
pub mod agent;
pub mod router;

pub use types::{
    CancellationToken, ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool,
    ToolCall, ToolResult,
};

pub use logging::{ConsoleLogger, Logger, NoOpLogger};

pub use config::{AppConfig, ConfigProvider, FileConfigProvider, MemoryConfigProvider};

pub use secrets::{
    ChainSecretStore, EnvSecretStore, MemorySecretStore, SecretInfo, SecretStore, SecretStoreError,
    SecretStoreResult,
};

pub use providers::{create_provider, Generator, Provider, ProviderError};

pub use tools::{
    RegistryError, ToolDefinition, ToolKind, ToolRegistry, ValidationError, ValidationMode,
};

pub use invoker::{DynamicInvoker, InvokeError, InvokerSettings};

pub use retrieval::{MemoryVectorStore, RetrievedDocument, VectorStore};

pub use bridge::{BridgeError, BridgeSession, BridgeSnapshot, McpSessionFactory, SessionFactory};

pub use agent::{AgentOutcome, ToolAgent};

pub use router::{Fragment, FragmentStream, QueryRouter, RouteError, RouterSettings, RoutingDecision};
