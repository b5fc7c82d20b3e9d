//! Tool domain
//!
//! A tool is a declarative description of an HTTP endpoint: identity,
//! transport and a typed parameter schema. No per-endpoint code exists; the
//! invoker calls any tool from its definition alone.
//!
//! ```text
//! wire JSON ──validate──▶ ToolDefinition ──upsert──▶ ToolRegistry ──▶ ToolStore (YAML)
//!                                                        │
//!                                  router / bridge ◀─────┘ (read-mostly cache)
//! ```

mod definition;
mod error;
mod registry;
mod store;
mod validator;

pub use definition::{HttpMethod, ParamSpec, ParamType, ToolDefinition, ToolKind};
pub use error::{RegistryError, RegistryResult, StoreError, StoreResult, ValidationError};
pub use registry::ToolRegistry;
pub use store::{FileToolStore, MemoryToolStore, ToolRecord, ToolStore};
pub use validator::{
    is_valid_param_name, is_valid_tool_name, validate, validate_definition, ValidationMode,
};
