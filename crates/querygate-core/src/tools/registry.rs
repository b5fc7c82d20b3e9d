//! Tool registry: the single writer of truth for tool definitions
//!
//! Constructed once from a durable [`ToolStore`] and injected wherever tools
//! are needed (router, CLI, bridge snapshots). Reads are served from an
//! in-memory cache; writes are serialized and hit the store before the cache.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use super::definition::{ToolDefinition, ToolKind};
use super::error::{RegistryError, RegistryResult};
use super::store::{MemoryToolStore, ToolRecord, ToolStore};
use super::validator::{validate, ValidationMode};
use crate::logging::Logger;

pub struct ToolRegistry {
    store: Arc<dyn ToolStore>,
    /// Name -> definition, insertion order
    tools: RwLock<IndexMap<String, ToolDefinition>>,
    /// Held for the whole store-then-cache write
    writer: Mutex<()>,
    mode: ValidationMode,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Load every stored definition
    ///
    /// Records that no longer decode are skipped with a warning rather than
    /// failing startup.
    pub async fn load(
        store: Arc<dyn ToolStore>,
        mode: ValidationMode,
        logger: Arc<dyn Logger>,
    ) -> RegistryResult<Self> {
        let mut tools = IndexMap::new();
        for record in store.select_all().await? {
            match record.definition() {
                Ok(def) => {
                    tools.insert(def.name.clone(), def);
                }
                Err(e) => logger.warn(&format!("[ToolRegistry] Skipping stored tool: {}", e)),
            }
        }

        logger.info(&format!("[ToolRegistry] Loaded {} tools", tools.len()));

        Ok(Self {
            store,
            tools: RwLock::new(tools),
            writer: Mutex::new(()),
            mode,
            logger,
        })
    }

    /// Empty registry over an in-memory store
    pub fn in_memory(logger: Arc<dyn Logger>) -> Self {
        Self {
            store: Arc::new(MemoryToolStore::new()),
            tools: RwLock::new(IndexMap::new()),
            writer: Mutex::new(()),
            mode: ValidationMode::Lenient,
            logger,
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate and persist, fully replacing any definition with the same name
    pub async fn upsert(&self, def: ToolDefinition) -> RegistryResult<ToolDefinition> {
        self.register_json(&def.to_value()).await
    }

    /// Register or update from wire-shape JSON
    pub async fn register_json(&self, raw: &Value) -> RegistryResult<ToolDefinition> {
        let def = validate(raw, self.mode)?;
        let record = ToolRecord::from_definition(&def)?;

        let _writer = self.writer.lock().await;
        self.store.upsert(record).await?;
        let replaced = self
            .tools
            .write()
            .insert(def.name.clone(), def.clone())
            .is_some();

        self.logger.info(&format!(
            "[ToolRegistry] {} tool '{}'",
            if replaced { "Updated" } else { "Registered" },
            def.name
        ));
        Ok(def)
    }

    /// Remove a tool; unknown names are `NotFound`
    pub async fn delete(&self, name: &str) -> RegistryResult<()> {
        let _writer = self.writer.lock().await;
        let stored = self.store.delete(name).await?;
        let cached = self.tools.write().shift_remove(name).is_some();

        if !stored && !cached {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        self.logger.info(&format!("[ToolRegistry] Deleted tool '{}'", name));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ToolDefinition> {
        self.tools.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// All definitions in insertion order
    pub fn list_all(&self) -> Vec<ToolDefinition> {
        self.tools.read().values().cloned().collect()
    }

    pub fn list_by_type(&self, kind: ToolKind) -> Vec<ToolDefinition> {
        self.tools
            .read()
            .values()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::definition::HttpMethod;
    use crate::tools::store::FileToolStore;
    use serde_json::json;
    use tempfile::tempdir;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn weather() -> ToolDefinition {
        ToolDefinition::new("weather", ToolKind::Api, HttpMethod::Get, "http://localhost/weather")
            .with_description("Current weather")
            .with_param("city", "string", true)
            .with_response_format("Temp: {temp}")
    }

    #[tokio::test]
    async fn test_upsert_then_list_round_trips() {
        let registry = ToolRegistry::in_memory(logger());
        let def = registry.upsert(weather()).await.unwrap();
        assert_eq!(def, weather());

        registry.upsert(weather()).await.unwrap();
        let all = registry.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], weather());
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_record() {
        let registry = ToolRegistry::in_memory(logger());
        registry.upsert(weather()).await.unwrap();

        let replacement =
            ToolDefinition::new("weather", ToolKind::Sql, HttpMethod::Post, "http://other/q")
                .with_param("sql", "string", true);
        registry.upsert(replacement.clone()).await.unwrap();

        assert_eq!(registry.len(), 1);
        let stored = registry.get("weather").unwrap();
        assert_eq!(stored, replacement);
        assert!(stored.response_format.is_none());
    }

    #[tokio::test]
    async fn test_invalid_definition_is_rejected_before_persisting() {
        let registry = ToolRegistry::in_memory(logger());
        let err = registry
            .register_json(&json!({"name": "bad name", "type": "API"}))
            .await
            .unwrap_err();
        match err {
            RegistryError::Validation(v) => assert!(v.violations.len() >= 3),
            other => panic!("unexpected error: {}", other),
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let registry = ToolRegistry::in_memory(logger());
        registry.upsert(weather()).await.unwrap();

        registry.delete("weather").await.unwrap();
        assert!(registry.get("weather").is_none());
        assert!(matches!(
            registry.delete("weather").await,
            Err(RegistryError::NotFound(name)) if name == "weather"
        ));
    }

    #[tokio::test]
    async fn test_list_by_type() {
        let registry = ToolRegistry::in_memory(logger());
        registry.upsert(weather()).await.unwrap();
        registry
            .upsert(
                ToolDefinition::new("orders", ToolKind::Sql, HttpMethod::Post, "http://db/q")
                    .with_param("customer", "int", true),
            )
            .await
            .unwrap();

        let sql = registry.list_by_type(ToolKind::Sql);
        assert_eq!(sql.len(), 1);
        assert_eq!(sql[0].name, "orders");
        assert_eq!(registry.names(), vec!["weather", "orders"]);
    }

    #[tokio::test]
    async fn test_reload_from_file_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tools.yaml");

        let registry = ToolRegistry::load(
            Arc::new(FileToolStore::new(&path)),
            ValidationMode::Strict,
            logger(),
        )
        .await
        .unwrap();
        registry.upsert(weather()).await.unwrap();
        drop(registry);

        let reloaded = ToolRegistry::load(
            Arc::new(FileToolStore::new(&path)),
            ValidationMode::Strict,
            logger(),
        )
        .await
        .unwrap();
        assert_eq!(reloaded.get("weather"), Some(weather()));
    }

    #[tokio::test]
    async fn test_strict_mode_applies_to_upsert() {
        let registry = ToolRegistry::in_memory(logger()).with_mode(ValidationMode::Strict);
        let raw = json!({
            "name": "t", "type": "API", "url": "http://h/x", "method": "GET",
            "description": "", "input_schema": {"q": {"type": "string"}}
        });
        assert!(registry.register_json(&raw).await.is_err());
    }
}
