//! MCP Tool definitions and handlers
//!
//! Defines the ping-pong tool and routes calls to the session store.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::McpError;
use crate::mcp::types::{CallToolResult, Tool};
use crate::pingpong;
use crate::session::SessionStore;

/// Name of the ping-pong tool
pub const PING_PONG_TOOL: &str = "ping-pong";

/// Tool handler
#[derive(Clone)]
pub struct ToolHandler {
    store: Arc<SessionStore>,
}

impl ToolHandler {
    /// Create a new tool handler backed by `store`
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![tool_def(
            PING_PONG_TOOL,
            "MCP handler for ping-pong commands",
            ping_pong_schema(),
        )]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        match name {
            PING_PONG_TOOL => self.handle_ping_pong(args),
            _ => CallToolResult::error(
                McpError::UnknownTool {
                    name: name.to_string(),
                }
                .to_string(),
            ),
        }
    }

    // ==================== Tool Handlers ====================

    fn handle_ping_pong(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            command: String,
            session_id: String,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let reply = pingpong::execute(&self.store, &args.command, Some(&args.session_id));
        tracing::debug!(
            command = %args.command,
            session_id = %reply.session_id,
            reply = %reply.text,
            "Handled ping-pong call"
        );

        CallToolResult::text(reply.text)
    }
}

fn tool_def(name: &str, description: &str, schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: schema,
    }
}

// ==================== Schemas ====================

fn ping_pong_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "command": {
                "type": "string",
                "description": "Command to run: 'ping', 'pong' or 'count'"
            },
            "session_id": {
                "type": "string",
                "description": "Session whose counter the command applies to"
            }
        },
        "required": ["command", "session_id"]
    })
}
