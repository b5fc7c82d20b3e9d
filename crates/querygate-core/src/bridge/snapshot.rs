//! Registry snapshot handed to a bridge child
//!
//! Taken once when a session opens; the child never sees later registry writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::error::{BridgeError, BridgeResult};
use crate::invoker::InvokerSettings;
use crate::tools::{validate_definition, ToolDefinition, ToolRegistry, ValidationMode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    pub tools: Vec<ToolDefinition>,
    #[serde(default)]
    pub invoker: InvokerSettings,
}

impl BridgeSnapshot {
    pub fn new(tools: Vec<ToolDefinition>, invoker: InvokerSettings) -> Self {
        Self { tools, invoker }
    }

    pub fn of_registry(registry: &ToolRegistry, invoker: InvokerSettings) -> Self {
        Self::new(registry.list_all(), invoker)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Write to a temp file that is removed when the handle drops
    pub fn write_temp(&self) -> BridgeResult<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("querygate-snapshot-")
            .suffix(".json")
            .tempfile()?;
        let json = serde_json::to_vec(self).map_err(|e| BridgeError::Protocol(e.to_string()))?;
        file.write_all(&json)?;
        file.flush()?;
        Ok(file)
    }

    /// Read a snapshot file, dropping definitions that no longer validate
    pub fn read(path: &Path) -> BridgeResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut snapshot: Self = serde_json::from_str(&content)
            .map_err(|e| BridgeError::Protocol(format!("invalid snapshot: {}", e)))?;
        snapshot
            .tools
            .retain(|def| validate_definition(def, ValidationMode::Lenient).is_ok());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{HttpMethod, ToolKind};

    #[test]
    fn test_temp_file_lifecycle() {
        let def = ToolDefinition::new("weather", ToolKind::Api, HttpMethod::Get, "http://localhost/w")
            .with_param("city", "string", true);
        let snapshot = BridgeSnapshot::new(vec![def], InvokerSettings::default());

        let file = snapshot.write_temp().unwrap();
        let path = file.path().to_path_buf();
        let back = BridgeSnapshot::read(&path).unwrap();
        assert_eq!(back.tools.len(), 1);
        assert!(back.get("weather").is_some());
        assert_eq!(back.invoker, InvokerSettings::default());

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_read_skips_invalid_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let json = serde_json::json!({
            "tools": [
                {"name": "ok", "type": "API", "url": "http://localhost/ok", "method": "GET",
                 "input_schema": {"q": {"type": "string", "required": true}}},
                {"name": "bad", "type": "API", "url": "http://localhost/bad", "method": "GET",
                 "input_schema": {}}
            ]
        });
        fs::write(&path, json.to_string()).unwrap();

        let snapshot = BridgeSnapshot::read(&path).unwrap();
        assert_eq!(snapshot.tools.len(), 1);
        assert_eq!(snapshot.tools[0].name, "ok");
    }
}
