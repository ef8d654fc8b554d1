//! Plain HTTP API
//!
//! `GET /ping-pong` looks up a registered prompt, `POST /ping-pong` runs a
//! command through the MCP tool layer. Failures are reported in the JSON body
//! rather than through the status code.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::mcp::server::McpServer;
use crate::mcp::tools::PING_PONG_TOOL;
use crate::session::SessionStore;

/// Shared state for the API routes
#[derive(Clone)]
pub struct ApiState {
    store: Arc<SessionStore>,
    mcp: Arc<McpServer>,
}

impl ApiState {
    pub fn new(store: Arc<SessionStore>) -> Self {
        let mcp = Arc::new(McpServer::new(store.clone()));
        Self { store, mcp }
    }
}

/// Build the API router over `store`
pub fn router(store: Arc<SessionStore>) -> Router {
    Router::new()
        .route("/ping-pong", get(get_prompt_handler).post(command_handler))
        .route("/health", get(health_check_handler))
        .with_state(ApiState::new(store))
        .layer(TraceLayer::new_for_http())
        .layer(super::cors_layer())
}

#[derive(Debug, Deserialize)]
struct PromptQuery {
    #[serde(default)]
    prompt_name: Option<String>,
}

/// Body of a `POST /ping-pong` reply
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandResponse {
    Data {
        data: String,
        session_id: String,
    },
    Error {
        error: String,
        session_id: Option<String>,
    },
}

async fn get_prompt_handler(
    State(state): State<ApiState>,
    Query(query): Query<PromptQuery>,
) -> Json<Value> {
    let prompt_name = match query.prompt_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Json(json!({"error": "prompt_name is required"})),
    };

    let prompts = state.mcp.prompts();
    let Some(prompt) = prompts
        .list_prompts()
        .into_iter()
        .find(|p| p.name == prompt_name)
    else {
        return Json(json!({"error": "Prompt not found"}));
    };

    match prompts.get_prompt(&prompt.name) {
        Ok(rendered) => {
            let content = rendered
                .messages
                .first()
                .map(|m| m.content.as_text().to_string())
                .unwrap_or_default();
            Json(json!({
                "prompt": prompt.name,
                "description": prompt.description,
                "content": content,
            }))
        }
        Err(e) => Json(json!({"error": e.to_string()})),
    }
}

async fn command_handler(State(state): State<ApiState>, body: Bytes) -> Json<CommandResponse> {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed command body");
            return Json(CommandResponse::Error {
                error: e.to_string(),
                session_id: None,
            });
        }
    };

    let Some(fields) = body.as_object() else {
        return Json(CommandResponse::Error {
            error: "request body must be a JSON object".to_string(),
            session_id: None,
        });
    };

    let requested = match fields.get("session_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.as_str()),
        Some(_) => {
            return Json(CommandResponse::Error {
                error: "session_id must be a string".to_string(),
                session_id: None,
            })
        }
    };

    let session_id = state.store.get_or_create(requested);

    let command = match fields.get("command") {
        None | Some(Value::Null) => "",
        Some(Value::String(command)) => command.as_str(),
        Some(_) => {
            return Json(CommandResponse::Error {
                error: "command must be a string".to_string(),
                session_id: Some(session_id),
            })
        }
    };

    let result = state
        .mcp
        .tool_handler()
        .call_tool(
            PING_PONG_TOOL,
            json!({"command": command, "session_id": session_id}),
        )
        .await;

    let text = result.first_text().unwrap_or_default().to_string();
    tracing::info!(command = %command, session_id = %session_id, reply = %text, "Handled command");

    if result.is_error {
        Json(CommandResponse::Error {
            error: text,
            session_id: Some(session_id),
        })
    } else {
        Json(CommandResponse::Data {
            data: text,
            session_id,
        })
    }
}

async fn health_check_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
