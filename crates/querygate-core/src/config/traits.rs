//! Configuration provider trait

use async_trait::async_trait;

use super::app::AppConfig;

/// Source of the application configuration
///
/// Implementations:
/// - `FileConfigProvider`: YAML file (user or workspace level)
/// - `MemoryConfigProvider`: in-memory for tests
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Current configuration; a missing source yields the defaults
    async fn load(&self) -> ConfigResult<AppConfig>;

    async fn save(&self, config: &AppConfig) -> ConfigResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
