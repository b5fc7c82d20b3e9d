//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::app::AppConfig;
use super::traits::{ConfigProvider, ConfigResult};

#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<AppConfig>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> ConfigResult<AppConfig> {
        Ok(self.config.read().clone())
    }

    async fn save(&self, config: &AppConfig) -> ConfigResult<()> {
        *self.config.write() = config.clone();
        Ok(())
    }
}
