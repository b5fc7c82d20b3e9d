//! Parent side of the bridge: one child process per session
//!
//! ```text
//! open() ──spawn──▶ child (querygate bridge --snapshot <file>)
//!   │                 ▲ stdin / stdout carry MCP
//!   ├─ initialize ────┤
//!   ├─ tools/list ────┤
//!   ├─ tools/call * ──┤
//!   └─ close() ── cancel, kill, reap
//! ```

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::process::{Child, Command};

use super::error::{BridgeError, BridgeResult};
use super::snapshot::BridgeSnapshot;
use crate::config::BridgeSettings;
use crate::logging::Logger;
use crate::types::Tool;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    CatalogueFetched,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::CatalogueFetched => "catalogue-fetched",
            SessionState::Closed => "closed",
        }
    }
}

/// One exclusive, sequential tool session
#[async_trait]
pub trait BridgeSession: Send {
    fn state(&self) -> SessionState;

    /// Fetch the tool catalogue; required before `invoke`
    async fn catalogue(&mut self) -> BridgeResult<Vec<Tool>>;

    /// Call one tool and wait for its text result
    ///
    /// A result the tool flags as an error comes back as [`BridgeError::ToolCall`].
    async fn invoke(&mut self, name: &str, args: Value) -> BridgeResult<String>;

    /// Release the channel and the child; safe to call twice
    async fn close(&mut self) -> BridgeResult<()>;
}

/// Opens a fresh session per fallback
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, snapshot: BridgeSnapshot) -> BridgeResult<Box<dyn BridgeSession>>;
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "querygate-router".to_string(),
            title: Some("querygate router".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// Convert an MCP tool into the generator's tool type
fn from_mcp_tool(tool: &rmcp::model::Tool) -> Tool {
    let value = serde_json::to_value(tool).unwrap_or(Value::Null);
    let description = value
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut converted = Tool::new(tool.name.to_string(), description);
    if let Some(schema) = value.get("inputSchema") {
        converted = converted.with_schema(schema.clone());
    }
    converted
}

/// Join the text parts of a `tools/call` result
fn result_text(result: &rmcp::model::CallToolResult) -> (String, bool) {
    let value = serde_json::to_value(result).unwrap_or(Value::Null);
    let text = value
        .get("content")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();
    let is_error = value.get("isError").and_then(Value::as_bool).unwrap_or(false);
    (text, is_error)
}

/// MCP session over a spawned child's stdio
pub struct McpSession {
    child: Child,
    service: Option<RunningService<RoleClient, ClientInfo>>,
    state: SessionState,
    call_timeout: Duration,
    _snapshot: NamedTempFile,
    logger: Arc<dyn Logger>,
}

impl McpSession {
    /// Spawn the child and run the initialize handshake
    pub async fn spawn(
        program: PathBuf,
        args: &[String],
        snapshot: &BridgeSnapshot,
        settings: &BridgeSettings,
        logger: Arc<dyn Logger>,
    ) -> BridgeResult<Self> {
        let file = snapshot.write_temp()?;

        let mut child = Command::new(&program)
            .args(args)
            .arg("--snapshot")
            .arg(file.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BridgeError::Spawn(format!("{}: {}", program.display(), e)))?;

        logger.info(&format!(
            "[Bridge] Spawned {} (pid {:?}) with {} tools",
            program.display(),
            child.id(),
            snapshot.tools.len()
        ));

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Spawn("child stdout not captured".into()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::Spawn("child stdin not captured".into()))?;

        let mut session = Self {
            child,
            service: None,
            state: SessionState::Uninitialized,
            call_timeout: Duration::from_millis(settings.call_timeout_ms),
            _snapshot: file,
            logger,
        };

        let handshake = client_info().serve((stdout, stdin));
        match tokio::time::timeout(Duration::from_millis(settings.init_timeout_ms), handshake).await {
            Ok(Ok(service)) => {
                session.service = Some(service);
                session.state = SessionState::Initialized;
                session.logger.debug("[Bridge] Handshake complete");
                Ok(session)
            }
            Ok(Err(e)) => {
                session.shutdown().await;
                Err(BridgeError::Initialization(e.to_string()))
            }
            Err(_) => {
                session.shutdown().await;
                Err(BridgeError::Timeout(settings.init_timeout_ms))
            }
        }
    }

    /// Child pid while it is still running
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn service(&self, operation: &'static str) -> BridgeResult<&RunningService<RoleClient, ClientInfo>> {
        match (&self.service, self.state) {
            (Some(service), SessionState::Initialized | SessionState::CatalogueFetched) => Ok(service),
            _ => Err(BridgeError::InvalidState {
                state: self.state.as_str(),
                operation,
            }),
        }
    }

    async fn shutdown(&mut self) {
        if let Some(service) = self.service.take() {
            if let Err(e) = service.cancel().await {
                self.logger.debug(&format!("[Bridge] Cancel failed: {}", e));
            }
        }
        if let Err(e) = self.child.kill().await {
            self.logger.debug(&format!("[Bridge] Kill failed: {}", e));
        }
        self.state = SessionState::Closed;
    }
}

#[async_trait]
impl BridgeSession for McpSession {
    fn state(&self) -> SessionState {
        self.state
    }

    async fn catalogue(&mut self) -> BridgeResult<Vec<Tool>> {
        let timeout_ms = self.call_timeout.as_millis() as u64;
        let service = self.service("fetch the catalogue")?;
        let result = tokio::time::timeout(self.call_timeout, service.list_tools(Default::default()))
            .await
            .map_err(|_| BridgeError::Timeout(timeout_ms))?
            .map_err(|e| BridgeError::Protocol(e.to_string()))?;

        let tools: Vec<Tool> = result.tools.iter().map(from_mcp_tool).collect();
        self.logger
            .info(&format!("[Bridge] Catalogue has {} tools", tools.len()));
        self.state = SessionState::CatalogueFetched;
        Ok(tools)
    }

    async fn invoke(&mut self, name: &str, args: Value) -> BridgeResult<String> {
        if self.state != SessionState::CatalogueFetched {
            return Err(BridgeError::InvalidState {
                state: self.state.as_str(),
                operation: "invoke a tool",
            });
        }
        let timeout_ms = self.call_timeout.as_millis() as u64;
        let service = self.service("invoke a tool")?;

        self.logger.info(&format!("[Bridge] Calling tool: {}", name));
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: args.as_object().cloned(),
            task: None,
        };

        let result = tokio::time::timeout(self.call_timeout, service.call_tool(params))
            .await
            .map_err(|_| BridgeError::Timeout(timeout_ms))?
            .map_err(|e| BridgeError::ToolCall(e.to_string()))?;

        let (text, is_error) = result_text(&result);
        if is_error {
            self.logger
                .warn(&format!("[Bridge] Tool '{}' reported: {}", name, text));
            return Err(BridgeError::ToolCall(text));
        }
        Ok(text)
    }

    async fn close(&mut self) -> BridgeResult<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.logger.info("[Bridge] Closing session");
        self.shutdown().await;
        Ok(())
    }
}

impl Drop for McpSession {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            let _ = self.child.start_kill();
        }
    }
}

/// Spawns `bridge.program` (or the running executable) per session
pub struct McpSessionFactory {
    program: PathBuf,
    args: Vec<String>,
    settings: BridgeSettings,
    logger: Arc<dyn Logger>,
}

impl McpSessionFactory {
    pub fn new(settings: BridgeSettings, logger: Arc<dyn Logger>) -> BridgeResult<Self> {
        let program = match &settings.program {
            Some(program) => program.clone(),
            None => std::env::current_exe()?,
        };
        Ok(Self {
            program,
            args: settings.args.clone(),
            settings,
            logger,
        })
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

#[async_trait]
impl SessionFactory for McpSessionFactory {
    async fn open(&self, snapshot: BridgeSnapshot) -> BridgeResult<Box<dyn BridgeSession>> {
        let session = McpSession::spawn(
            self.program.clone(),
            &self.args,
            &snapshot,
            &self.settings,
            self.logger.clone(),
        )
        .await?;
        Ok(Box::new(session))
    }
}
