//! Command execution

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;

use querygate_core::bridge::{serve_stdio, McpSessionFactory};
use querygate_core::config::{AppConfig, ConfigLevel, ConfigProvider, FileConfigProvider};
use querygate_core::logging::Logger;
use querygate_core::providers::{create_provider, Generator, ProviderModelConfig};
use querygate_core::retrieval::MemoryVectorStore;
use querygate_core::router::{Fragment, QueryRouter, RouterSettings};
use querygate_core::secrets::default_chain;
use querygate_core::tools::{FileToolStore, ToolKind, ToolRegistry, ValidationMode};

use crate::error::{CliError, CliResult};

pub async fn load_config(path: Option<&Path>) -> CliResult<AppConfig> {
    let provider = match path {
        Some(path) => FileConfigProvider::new(path, ConfigLevel::User),
        None => FileConfigProvider::user(),
    };
    Ok(provider.load().await?)
}

async fn open_registry(config: &AppConfig, logger: Arc<dyn Logger>) -> CliResult<ToolRegistry> {
    let store = match &config.store.path {
        Some(path) => FileToolStore::new(path),
        None => FileToolStore::user(),
    };
    let mode = ValidationMode::from_strict(config.validation.strict);
    Ok(ToolRegistry::load(Arc::new(store), mode, logger).await?)
}

/// Stream one answer to stdout; `false` when it ended in an error fragment
pub async fn route(config: AppConfig, query: &str, logger: Arc<dyn Logger>) -> CliResult<bool> {
    let registry = Arc::new(open_registry(&config, logger.clone()).await?);

    let retriever = match &config.retrieval.documents_path {
        Some(path) => MemoryVectorStore::from_file(path)?,
        None => MemoryVectorStore::new(),
    };

    let provider = create_provider(&config.generator.provider, Arc::new(default_chain()), logger.clone());
    let mut model = ProviderModelConfig::new(&config.generator.model);
    if let Some(key) = &config.generator.api_key {
        model = model.with_api_key(key);
    }
    if let Some(base) = &config.generator.api_base {
        model = model.with_api_base(base);
    }
    let mut generator = Generator::new(provider, model, logger.clone());
    if let Some(temperature) = config.generator.temperature {
        generator = generator.with_temperature(temperature);
    }

    let sessions = McpSessionFactory::new(config.bridge.clone(), logger.clone())?;
    let router = QueryRouter::new(
        registry,
        Arc::new(retriever),
        generator,
        Arc::new(sessions),
        RouterSettings::from_config(&config),
        logger,
    )?;

    let mut stdout = std::io::stdout();
    let mut fragments = router.route(query);
    let mut ok = true;
    while let Some(fragment) = fragments.next().await {
        match &fragment {
            Fragment::Text(text) => write!(stdout, "{}", text)?,
            Fragment::Error { .. } => {
                ok = false;
                write!(stdout, "{}", fragment)?;
            }
        }
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(ok)
}

pub async fn tools_list(config: AppConfig, kind: Option<&str>, logger: Arc<dyn Logger>) -> CliResult<()> {
    let registry = open_registry(&config, logger).await?;
    let tools = match kind {
        Some(kind) => {
            let kind = ToolKind::parse(kind).ok_or_else(|| CliError::UnknownKind(kind.to_string()))?;
            registry.list_by_type(kind)
        }
        None => registry.list_all(),
    };

    if tools.is_empty() {
        println!("No tools registered.");
        return Ok(());
    }
    for tool in tools {
        println!(
            "{:<24} {:<4} {:<6} {}",
            tool.name,
            tool.kind.as_str(),
            tool.method.as_str(),
            tool.url
        );
    }
    Ok(())
}

pub async fn tools_show(config: AppConfig, name: &str, logger: Arc<dyn Logger>) -> CliResult<()> {
    let registry = open_registry(&config, logger).await?;
    let tool = registry
        .get(name)
        .ok_or_else(|| querygate_core::tools::RegistryError::NotFound(name.to_string()))?;
    println!("{}", tool.detail());
    Ok(())
}

/// Definitions from a JSON or YAML file: one object or a list of them
fn read_definitions(path: &Path) -> CliResult<Vec<Value>> {
    let input_error = |message: String| CliError::Input {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| input_error(e.to_string()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let value: Value = if is_json {
        serde_json::from_str(&content).map_err(|e| input_error(e.to_string()))?
    } else {
        serde_yaml::from_str(&content).map_err(|e| input_error(e.to_string()))?
    };

    match value {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}

pub async fn tools_add(config: AppConfig, file: &Path, logger: Arc<dyn Logger>) -> CliResult<()> {
    let registry = open_registry(&config, logger).await?;
    for raw in read_definitions(file)? {
        let def = registry.register_json(&raw).await?;
        println!("Saved {}", def.name);
    }
    Ok(())
}

pub async fn tools_delete(config: AppConfig, name: &str, logger: Arc<dyn Logger>) -> CliResult<()> {
    let registry = open_registry(&config, logger).await?;
    registry.delete(name).await?;
    println!("Deleted {}", name);
    Ok(())
}

pub async fn bridge(snapshot: &Path, logger: Arc<dyn Logger>) -> CliResult<()> {
    serve_stdio(snapshot, logger).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_definitions_single_and_list() {
        let dir = tempfile::tempdir().unwrap();

        let single = dir.path().join("one.json");
        std::fs::write(&single, r#"{"name": "weather"}"#).unwrap();
        assert_eq!(read_definitions(&single).unwrap().len(), 1);

        let list = dir.path().join("many.yaml");
        std::fs::write(&list, "- name: a\n- name: b\n").unwrap();
        let defs = read_definitions(&list).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1]["name"], "b");
    }

    #[test]
    fn test_read_definitions_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_definitions(&path), Err(CliError::Input { .. })));
    }
}
