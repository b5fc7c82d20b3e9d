//! Application configuration
//!
//! Every field has a default, so an empty (or missing) file is a valid config.
//!
//! ```yaml
//! store:
//!   path: /var/lib/querygate/tools.yaml
//! retrieval:
//!   score_threshold: 0.65
//!   documents_path: docs.yaml
//! generator:
//!   provider: ollama
//!   model: qwen2.5:1.5b
//! answer:
//!   language: English
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::invoker::InvokerSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub validation: ValidationSettings,
    pub retrieval: RetrievalSettings,
    pub generator: GeneratorSettings,
    pub answer: AnswerSettings,
    pub invoker: InvokerSettings,
    pub bridge: BridgeSettings,
    pub agent: AgentSettings,
    pub catalogue: CatalogueSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Tool definitions file; `~/.config/querygate/tools.yaml` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Require an explicit `required` flag on every parameter
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub score_threshold: f32,
    /// `[{content, source}]` file loaded into the in-process store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_path: Option<PathBuf>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            score_threshold: 0.65,
            documents_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Takes precedence over env vars and the keychain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            api_base: None,
            api_key: None,
            temperature: None,
        }
    }
}

/// Grounded-answer contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    pub language: String,
    /// Emitted when the context cannot answer the question
    pub insufficient_context: String,
    /// Emitted when the question is unrelated to the context
    pub off_topic: String,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            insufficient_context: "The provided material cannot answer this question.".to_string(),
            off_topic: "The question is outside the scope of the knowledge base.".to_string(),
        }
    }
}

/// Child process that serves the tool bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Executable; the running binary when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
    /// Arguments placed before `--snapshot <file>`
    pub args: Vec<String>,
    pub init_timeout_ms: u64,
    pub call_timeout_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            program: None,
            args: vec!["bridge".to_string()],
            init_timeout_ms: 10_000,
            call_timeout_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Upper bound on generator turns per fallback
    pub max_steps: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { max_steps: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueSettings {
    /// Queries that list every registered tool
    pub list_phrases: Vec<String>,
    /// `<prefix><name>` shows one tool's configuration
    pub detail_prefixes: Vec<String>,
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self {
            list_phrases: [
                "tools",
                "list tools",
                "工具",
                "工具列表",
                "工具列表查询",
                "查询工具列表",
                "查询可用工具",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            detail_prefixes: vec!["tool ".to_string(), "工具".to_string()],
        }
    }
}
