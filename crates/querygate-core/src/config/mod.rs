//! Configuration
//!
//! - `AppConfig`: every knob, all defaulted
//! - `FileConfigProvider`: YAML file (user/workspace level)
//! - `MemoryConfigProvider`: in-memory for tests

mod app;
mod file;
mod memory;
mod traits;

pub use app::{
    AgentSettings, AnswerSettings, AppConfig, BridgeSettings, CatalogueSettings,
    GeneratorSettings, RetrievalSettings, StoreSettings, ValidationSettings,
};
pub use file::{ConfigLevel, FileConfigProvider};
pub use memory::MemoryConfigProvider;
pub use traits::{ConfigError, ConfigProvider, ConfigResult};
