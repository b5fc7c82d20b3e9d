//! Durable storage for tool definitions
//!
//! Records are keyed by name and carry the serialized wire-shape JSON.
//! `FileToolStore` keeps them in one YAML file (`~/.config/querygate/tools.yaml`
//! by default) and replaces it atomically on every write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::definition::{ToolDefinition, ToolKind};
use super::error::{StoreError, StoreResult};

/// One persisted row: `{name, type, config}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ToolKind,
    /// Wire-shape JSON of the whole definition
    pub config: String,
}

impl ToolRecord {
    pub fn from_definition(def: &ToolDefinition) -> StoreResult<Self> {
        Ok(Self {
            name: def.name.clone(),
            kind: def.kind,
            config: serde_json::to_string(def)?,
        })
    }

    pub fn definition(&self) -> StoreResult<ToolDefinition> {
        serde_json::from_str(&self.config).map_err(|e| StoreError::Corrupt {
            name: self.name.clone(),
            message: e.to_string(),
        })
    }
}

/// Keyed record storage behind the registry
#[async_trait]
pub trait ToolStore: Send + Sync {
    /// Insert or fully replace the record with the same name
    async fn upsert(&self, record: ToolRecord) -> StoreResult<()>;

    /// Remove by name; `false` when nothing was stored under it
    async fn delete(&self, name: &str) -> StoreResult<bool>;

    async fn select_all(&self) -> StoreResult<Vec<ToolRecord>>;

    async fn select_by_type(&self, kind: ToolKind) -> StoreResult<Vec<ToolRecord>> {
        Ok(self
            .select_all()
            .await?
            .into_iter()
            .filter(|r| r.kind == kind)
            .collect())
    }
}

/// In-memory store for tests and throwaway registries
#[derive(Debug, Default)]
pub struct MemoryToolStore {
    records: Mutex<IndexMap<String, ToolRecord>>,
}

impl MemoryToolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ToolStore for MemoryToolStore {
    async fn upsert(&self, record: ToolRecord) -> StoreResult<()> {
        self.records.lock().insert(record.name.clone(), record);
        Ok(())
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        Ok(self.records.lock().shift_remove(name).is_some())
    }

    async fn select_all(&self) -> StoreResult<Vec<ToolRecord>> {
        Ok(self.records.lock().values().cloned().collect())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ToolsFile {
    #[serde(default)]
    tools: Vec<ToolRecord>,
}

/// YAML file store
///
/// The file is read on every select so edits made by another process (the CLI)
/// are picked up; writes go through a temp file in the same directory and a rename.
pub struct FileToolStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileToolStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `~/.config/querygate/tools.yaml`
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("querygate").join("tools.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> StoreResult<IndexMap<String, ToolRecord>> {
        if !self.path.exists() {
            return Ok(IndexMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(IndexMap::new());
        }
        let file: ToolsFile = serde_yaml::from_str(&content)?;
        Ok(file
            .tools
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect())
    }

    fn write(&self, records: &IndexMap<String, ToolRecord>) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let file = ToolsFile {
            tools: records.values().cloned().collect(),
        };
        let content = serde_yaml::to_string(&file)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl std::fmt::Debug for FileToolStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileToolStore")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ToolStore for FileToolStore {
    async fn upsert(&self, record: ToolRecord) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        let mut records = self.read()?;
        records.insert(record.name.clone(), record);
        self.write(&records)
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock();
        let mut records = self.read()?;
        if records.shift_remove(name).is_none() {
            return Ok(false);
        }
        self.write(&records)?;
        Ok(true)
    }

    async fn select_all(&self) -> StoreResult<Vec<ToolRecord>> {
        Ok(self.read()?.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::definition::HttpMethod;
    use tempfile::tempdir;

    fn record(name: &str, kind: ToolKind) -> ToolRecord {
        let def = ToolDefinition::new(name, kind, HttpMethod::Post, "http://localhost/x")
            .with_param("q", "string", true);
        ToolRecord::from_definition(&def).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryToolStore::new();
        store.upsert(record("a", ToolKind::Api)).await.unwrap();
        store.upsert(record("b", ToolKind::Sql)).await.unwrap();
        store.upsert(record("a", ToolKind::Sql)).await.unwrap();

        assert_eq!(store.len(), 2);
        let sql = store.select_by_type(ToolKind::Sql).await.unwrap();
        assert_eq!(sql.len(), 2);

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("tools.yaml");

        let store = FileToolStore::new(&path);
        assert!(store.select_all().await.unwrap().is_empty());
        store.upsert(record("zeta", ToolKind::Api)).await.unwrap();
        store.upsert(record("alpha", ToolKind::Sql)).await.unwrap();
        assert!(store.exists());

        let reopened = FileToolStore::new(&path);
        let names: Vec<String> = reopened
            .select_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let def = reopened.select_all().await.unwrap()[1].definition().unwrap();
        assert_eq!(def.kind, ToolKind::Sql);
        assert_eq!(def.method, HttpMethod::Post);
    }

    #[tokio::test]
    async fn test_file_store_delete() {
        let dir = tempdir().unwrap();
        let store = FileToolStore::new(dir.path().join("tools.yaml"));
        store.upsert(record("a", ToolKind::Api)).await.unwrap();

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.select_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record() {
        let rec = ToolRecord {
            name: "x".into(),
            kind: ToolKind::Api,
            config: "{not json".into(),
        };
        assert!(matches!(rec.definition(), Err(StoreError::Corrupt { .. })));
    }
}
