//! Autonomous tool-calling fallback
//!
//! The agent sees only what a bridge session exposes: the catalogue and an
//! `invoke` call. Its trace decides whether the router trusts the answer.

mod outcome;
mod tool_agent;

pub use outcome::{AgentError, AgentOutcome, AgentResult, TraceEntry};
pub use tool_agent::ToolAgent;
