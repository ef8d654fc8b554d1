//! MCP Server implementation
//!
//! Dispatches JSON-RPC messages to the tool and prompt handlers. The same
//! server is driven over stdio here and over SSE by the transport module.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{McpError, PingPongError, Result};
use crate::mcp::prompts::PromptRegistry;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;
use crate::session::SessionStore;

/// MCP Server info
pub const SERVER_NAME: &str = "ping-pong";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the ping-pong tool
pub struct McpServer {
    /// Tool handler
    tool_handler: ToolHandler,

    /// Prompt registry
    prompts: PromptRegistry,
}

impl McpServer {
    /// Create a new MCP server over a shared session store
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            tool_handler: ToolHandler::new(store),
            prompts: PromptRegistry::new(),
        }
    }

    /// Tool handler used by this server
    pub fn tool_handler(&self) -> &ToolHandler {
        &self.tool_handler
    }

    /// Prompt registry used by this server
    pub fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        tracing::info!("MCP server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match self.handle_message(&line).await {
                Ok(Some(response)) => {
                    let mut response_str = serde_json::to_string(&response)?;
                    response_str.push('\n');
                    stdout.write_all(response_str.as_bytes()).await?;
                    stdout.flush().await?;
                }
                Ok(None) => {
                    // Notification, no response needed
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error handling message");
                }
            }
        }

        tracing::info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Handle an incoming raw JSON-RPC message
    pub async fn handle_message(&self, message: &str) -> Result<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Ok(Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                )));
            }
        };

        self.handle_request(request).await
    }

    /// Handle an already-parsed JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Result<Option<JsonRpcResponse>> {
        tracing::debug!(method = %request.method, id = ?request.id, "Handling MCP request");

        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return Ok(None);
        }

        let id = request.id.clone();
        let outcome = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::INITIALIZED => Ok(serde_json::json!({})),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => self.handle_list_tools(),
            methods::CALL_TOOL => self.handle_call_tool(&request).await,
            methods::LIST_PROMPTS => self.handle_list_prompts(),
            methods::GET_PROMPT => self.handle_get_prompt(&request),
            _ => {
                return Ok(Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::method_not_found(&request.method),
                )))
            }
        };

        let response = match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(PingPongError::Mcp(e)) => {
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string()))
            }
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
        };

        Ok(Some(response))
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> Result<Value> {
        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                prompts: Some(PromptsCapability::default()),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> Result<Value> {
        let result = ListToolsResult {
            tools: self.tool_handler.list_tools(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> Result<Value> {
        let result = match request.params.as_ref() {
            Some(p) => match serde_json::from_value::<CallToolParams>(p.clone()) {
                Ok(params) => self.tool_handler.call_tool(&params.name, params.arguments).await,
                Err(e) => CallToolResult::error(format!("Invalid tool parameters: {}", e)),
            },
            None => CallToolResult::error("Missing tool parameters"),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle list prompts request
    fn handle_list_prompts(&self) -> Result<Value> {
        let result = ListPromptsResult {
            prompts: self.prompts.list_prompts(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle get prompt request
    fn handle_get_prompt(&self, request: &JsonRpcRequest) -> Result<Value> {
        let params: GetPromptParams = match request.params.as_ref() {
            Some(p) => serde_json::from_value(p.clone()).map_err(|e| {
                McpError::InvalidArguments {
                    message: e.to_string(),
                }
            })?,
            None => {
                return Err(McpError::InvalidArguments {
                    message: "Missing prompt parameters".to_string(),
                }
                .into())
            }
        };

        let result = self.prompts.get_prompt(&params.name)?;
        Ok(serde_json::to_value(result)?)
    }
}
