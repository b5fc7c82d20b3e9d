//! Dynamic invoker: one generic operation that calls any tool definition
//!
//! Steps per call: coerce arguments by declared type, enforce required
//! parameters, build the request (GET query string, otherwise JSON body),
//! send under bounded timeouts, decode by Content-Type, then format.

mod coerce;
mod dynamic;
mod error;
mod format;

pub use coerce::{bind_positional, coerce_arguments, coerce_value, Arguments};
pub use dynamic::{DynamicInvoker, InvokerSettings};
pub use error::{InvokeError, InvokeResult};
pub use format::{render, ToolOutput};
