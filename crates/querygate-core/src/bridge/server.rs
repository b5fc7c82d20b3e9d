//! Child side of the bridge
//!
//! Serves a registry snapshot as MCP tools over stdio. Every call goes
//! straight to the [`DynamicInvoker`].

use std::path::Path;
use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    ErrorData, RoleServer, ServerHandler, ServiceExt,
};
use serde_json::{Map, Value};

use super::error::{BridgeError, BridgeResult};
use super::snapshot::BridgeSnapshot;
use crate::invoker::DynamicInvoker;
use crate::logging::Logger;

pub struct BridgeServer {
    snapshot: BridgeSnapshot,
    invoker: DynamicInvoker,
    logger: Arc<dyn Logger>,
}

impl BridgeServer {
    pub fn new(snapshot: BridgeSnapshot, invoker: DynamicInvoker, logger: Arc<dyn Logger>) -> Self {
        Self {
            snapshot,
            invoker,
            logger,
        }
    }

    /// One MCP tool per snapshot definition
    pub fn tools(&self) -> Vec<rmcp::model::Tool> {
        self.snapshot
            .tools
            .iter()
            .map(|def| {
                rmcp::model::Tool::new(
                    def.name.clone(),
                    def.description.clone(),
                    Arc::new(def.parameters_schema()),
                )
            })
            .collect()
    }

    /// Invoke by name; failures come back as `{"error": ...}` text flagged as an error
    pub async fn call(&self, name: &str, args: Map<String, Value>) -> (String, bool) {
        let Some(def) = self.snapshot.get(name) else {
            self.logger
                .warn(&format!("[BridgeServer] Unknown tool: {}", name));
            let error = serde_json::json!({ "error": format!("unknown tool: {}", name) });
            return (error.to_string(), true);
        };

        match self.invoker.invoke_formatted(def, &args).await {
            Ok(text) => (text, false),
            Err(e) => {
                self.logger
                    .warn(&format!("[BridgeServer] Tool '{}' failed: {}", name, e));
                (e.to_error_value().to_string(), true)
            }
        }
    }
}

impl ServerHandler for BridgeServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation {
            name: "querygate-bridge".to_string(),
            title: Some("querygate tool bridge".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        };
        info.instructions = Some("Registered HTTP tools, one per definition.".to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = request.arguments.unwrap_or_default();
        let (text, is_error) = self.call(&request.name, args).await;
        if is_error {
            Ok(CallToolResult::error(vec![Content::text(text)]))
        } else {
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
    }
}

/// Run the child: read the snapshot, serve MCP on stdio until the parent hangs up
pub async fn serve_stdio(snapshot_path: &Path, logger: Arc<dyn Logger>) -> BridgeResult<()> {
    let snapshot = BridgeSnapshot::read(snapshot_path)?;
    crate::info_log!("bridge child {} starting", std::process::id());
    logger.info(&format!(
        "[BridgeServer] Serving {} tools from {}",
        snapshot.tools.len(),
        snapshot_path.display()
    ));

    let invoker = DynamicInvoker::new(snapshot.invoker, logger.clone())
        .map_err(|e| BridgeError::Initialization(e.to_string()))?;
    let server = BridgeServer::new(snapshot, invoker, logger.clone());

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| BridgeError::Initialization(e.to_string()))?;

    service
        .waiting()
        .await
        .map_err(|e| BridgeError::Protocol(e.to_string()))?;

    crate::info_log!("bridge child {} exiting", std::process::id());
    logger.info("[BridgeServer] Parent closed the channel");
    Ok(())
}
