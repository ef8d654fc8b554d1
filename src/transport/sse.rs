//! MCP over Server-Sent Events
//!
//! `GET /sse` opens a stream and announces the endpoint the client must POST
//! its JSON-RPC messages to. Responses travel back over the stream as
//! `message` events.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use futures_util::stream::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::mcp::server::McpServer;
use crate::mcp::types::JsonRpcRequest;
use crate::session::SessionStore;

/// Path clients POST messages to
pub const MESSAGE_PATH: &str = "/sse-transport";

/// Path clients open the event stream on
pub const STREAM_PATH: &str = "/sse";

const CHANNEL_CAPACITY: usize = 100;
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

struct Connection {
    tx: mpsc::Sender<String>,
    server: Arc<McpServer>,
}

/// Shared state for the SSE routes
#[derive(Clone)]
pub struct SseState {
    store: Arc<SessionStore>,
    connections: Arc<DashMap<Uuid, Connection>>,
}

impl SseState {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Number of open event streams
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

/// Build the SSE router over `store`
pub fn router(store: Arc<SessionStore>) -> Router {
    router_with_state(SseState::new(store))
}

/// Build the SSE router over an existing state
pub fn router_with_state(state: SseState) -> Router {
    Router::new()
        .route(STREAM_PATH, get(sse_handler))
        .route(MESSAGE_PATH, post(message_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(super::cors_layer())
}

// Removes the connection entry once the stream is dropped.
struct ConnectionGuard {
    connection_id: Uuid,
    connections: Arc<DashMap<Uuid, Connection>>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        info!(connection_id = %self.connection_id, "SSE connection closed");
        self.connections.remove(&self.connection_id);
    }
}

async fn sse_handler(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);

    state.connections.insert(
        connection_id,
        Connection {
            tx,
            server: Arc::new(McpServer::new(state.store.clone())),
        },
    );
    info!(%connection_id, "New SSE connection");

    let guard = ConnectionGuard {
        connection_id,
        connections: state.connections.clone(),
    };

    let endpoint = format!("{}?session_id={}", MESSAGE_PATH, connection_id.simple());

    let stream = async_stream::stream! {
        let _guard = guard;

        yield Ok(Event::default().event("endpoint").data(endpoint));

        while let Some(message) = rx.recv().await {
            yield Ok(Event::default().event("message").data(message));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(default)]
    session_id: Option<String>,
}

async fn message_handler(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Result<(StatusCode, &'static str), (StatusCode, String)> {
    let Some(raw_id) = query.session_id else {
        warn!("Message received without session_id");
        return Err((StatusCode::BAD_REQUEST, "session_id is required".to_string()));
    };

    let connection_id = Uuid::parse_str(&raw_id).map_err(|_| {
        warn!(session_id = %raw_id, "Invalid session_id");
        (StatusCode::BAD_REQUEST, "Invalid session ID".to_string())
    })?;

    // Clone out of the map so no shard lock is held across an await.
    let (tx, server) = match state.connections.get(&connection_id) {
        Some(conn) => (conn.tx.clone(), conn.server.clone()),
        None => {
            warn!(%connection_id, "Could not find session");
            return Err((StatusCode::NOT_FOUND, "Could not find session".to_string()));
        }
    };

    if tx.is_closed() {
        return Err((StatusCode::GONE, "Session stream closed".to_string()));
    }

    let request: JsonRpcRequest = serde_json::from_str(&body).map_err(|e| {
        warn!(%connection_id, error = %e, "Could not parse message");
        (StatusCode::BAD_REQUEST, "Could not parse message".to_string())
    })?;

    debug!(%connection_id, method = %request.method, "Accepted message");

    tokio::spawn(async move {
        let response = match server.handle_request(request).await {
            Ok(Some(response)) => response,
            Ok(None) => return,
            Err(e) => {
                error!(%connection_id, error = %e, "Failed to handle MCP request");
                return;
            }
        };

        let payload = match serde_json::to_string(&response) {
            Ok(p) => p,
            Err(e) => {
                error!(%connection_id, error = %e, "Failed to serialize response");
                return;
            }
        };

        if tx.send(payload).await.is_err() {
            warn!(%connection_id, "SSE stream closed before response was delivered");
        }
    });

    Ok((StatusCode::ACCEPTED, "Accepted"))
}
