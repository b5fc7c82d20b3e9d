//! Query routing
//!
//! ```text
//! query
//!   ├─ catalogue / detail / bare tool name ──▶ one reply fragment
//!   ├─ <tool>:<a1>,<a2> ──────────────────────▶ DynamicInvoker ─▶ one fragment
//!   ├─ retrieval hits >= threshold ─────────────▶ Generator stream ─▶ many fragments
//!   └─ no hits ─────▶ bridge session + ToolAgent ─▶ one fragment
//! ```
//!
//! Errors never abort the stream; they arrive as one final `Fragment::Error`.

mod error;
mod fragment;
mod literal;
mod prompt;
mod query_router;

pub use error::{RouteError, RouteResult};
pub use fragment::{Fragment, FragmentStream};
pub use literal::{split_arguments, split_literal, LiteralQuery};
pub use prompt::grounded_prompt;
pub use query_router::{QueryRouter, RouterSettings, RoutingDecision};
