//! Per-session tool bridge over MCP (rmcp)
//!
//! The router's agent fallback never calls tools in-process. Each fallback
//! opens a session: a fresh child process serving a snapshot of the registry,
//! reached over the child's stdio.
//!
//! # Example
//!
//! ```rust,ignore
//! use querygate_core::bridge::{BridgeSnapshot, McpSessionFactory, SessionFactory};
//!
//! let factory = McpSessionFactory::new(config.bridge.clone(), logger)?;
//! let mut session = factory.open(BridgeSnapshot::of_registry(&registry, config.invoker)).await?;
//!
//! let tools = session.catalogue().await?;
//! let text = session.invoke("weather", json!({"city": "Paris"})).await?;
//! session.close().await?;
//! ```

mod client;
mod error;
mod server;
mod snapshot;

pub use client::{BridgeSession, McpSession, McpSessionFactory, SessionFactory, SessionState};
pub use error::{BridgeError, BridgeResult};
pub use server::{serve_stdio, BridgeServer};
pub use snapshot::BridgeSnapshot;
