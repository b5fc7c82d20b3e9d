//! Generic invoke-by-definition over HTTP

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{coerce_arguments, Arguments};
use super::error::{InvokeError, InvokeResult};
use super::format::{render, ToolOutput};
use crate::logging::Logger;
use crate::tools::{HttpMethod, ToolDefinition};

/// Timeout budgets for every outbound tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerSettings {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5_000,
            acquire_timeout_ms: 2_000,
        }
    }
}

impl InvokerSettings {
    /// Hard ceiling for one call: no single phase can outlast the sum
    pub fn total_budget(&self) -> Duration {
        Duration::from_millis(
            self.connect_timeout_ms
                .saturating_add(self.read_timeout_ms)
                .saturating_add(self.write_timeout_ms)
                .saturating_add(self.acquire_timeout_ms),
        )
    }
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

fn query_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Calls any registered tool from its definition alone
///
/// Not retried. Transport failures surface as [`InvokeError`] values.
pub struct DynamicInvoker {
    client: Client,
    settings: InvokerSettings,
    logger: Arc<dyn Logger>,
}

impl DynamicInvoker {
    pub fn new(settings: InvokerSettings, logger: Arc<dyn Logger>) -> InvokeResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .read_timeout(Duration::from_millis(settings.read_timeout_ms))
            .timeout(settings.total_budget())
            .build()
            .map_err(|e| InvokeError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            settings,
            logger,
        })
    }

    pub fn settings(&self) -> &InvokerSettings {
        &self.settings
    }

    /// Coerce, send and decode
    pub async fn invoke(&self, def: &ToolDefinition, args: &Arguments) -> InvokeResult<ToolOutput> {
        let args = coerce_arguments(def, args)?;

        self.logger.debug(&format!(
            "[Invoker] {} {} ({} args) for tool '{}'",
            def.method,
            def.url,
            args.len(),
            def.name
        ));

        let mut request = self.client.request(method_of(def.method), &def.url);
        request = if def.method.uses_query_string() {
            let pairs: Vec<(String, String)> =
                args.iter().map(|(k, v)| (k.clone(), query_text(v))).collect();
            request.query(&pairs)
        } else {
            request.json(&Value::Object(args))
        };

        let response = request.send().await.map_err(|e| {
            let err = InvokeError::from(e);
            self.logger
                .warn(&format!("[Invoker] Tool '{}' failed: {}", def.name, err));
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            self.logger.warn(&format!(
                "[Invoker] Tool '{}' answered HTTP {}",
                def.name, status
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if content_type.contains("application/json") {
            let value: Value = response.json().await?;
            Ok(ToolOutput::Json(value))
        } else if content_type.contains("text/plain") || content_type.contains("text/html") {
            Ok(ToolOutput::Text(response.text().await?))
        } else {
            Err(InvokeError::UnsupportedContentType(content_type))
        }
    }

    /// Invoke and render through the tool's `response_format`
    pub async fn invoke_formatted(
        &self,
        def: &ToolDefinition,
        args: &Arguments,
    ) -> InvokeResult<String> {
        let output = self.invoke(def, args).await?;
        Ok(render(def.response_format.as_deref(), &output))
    }
}

impl std::fmt::Debug for DynamicInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicInvoker")
            .field("settings", &self.settings)
            .finish()
    }
}
