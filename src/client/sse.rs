//! MCP client over the SSE transport
//!
//! Opens the event stream, learns the POST endpoint from the first
//! `endpoint` event and correlates responses by JSON-RPC id.

use std::fmt;
use std::time::Duration;

use eventsource_stream::{Event, Eventsource};
use futures_util::{Stream, StreamExt};
use reqwest::Url;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{McpError, PingPongError, Result, TransportError};
use crate::mcp::tools::PING_PONG_TOOL;
use crate::mcp::types::*;

const CLIENT_NAME: &str = "ping-pong-client";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connected SSE client
pub struct SseClient {
    http: reqwest::Client,
    endpoint: Url,
    events: mpsc::Receiver<Event>,
    reader: JoinHandle<()>,
    next_id: i64,
}

impl SseClient {
    /// Open the event stream at `url` and wait up to `timeout` for the endpoint event
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(url).map_err(|_| TransportError::InvalidEndpoint {
            endpoint: url.to_string(),
        })?;

        let http = reqwest::Client::new();
        let response = http
            .get(base.clone())
            .header("accept", "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: response.status().as_u16(),
            }
            .into());
        }

        let (tx, mut events) = mpsc::channel(100);
        let reader = tokio::spawn(forward_events(response.bytes_stream(), tx));

        let endpoint_event = tokio::time::timeout(timeout, async {
            while let Some(event) = events.recv().await {
                if event_kind(&event) == "endpoint" {
                    return Some(event);
                }
            }
            None
        })
        .await
        .map_err(|_| TransportError::Timeout {
            secs: timeout.as_secs(),
        })?
        .ok_or_else(|| TransportError::ConnectionClosed {
            message: "stream ended before endpoint event".to_string(),
        })?;

        let endpoint = base.join(&endpoint_event.data).map_err(|_| {
            TransportError::InvalidEndpoint {
                endpoint: endpoint_event.data.clone(),
            }
        })?;
        tracing::info!(endpoint = %endpoint, "Connected to SSE server");

        Ok(Self {
            http,
            endpoint,
            events,
            reader,
            next_id: 0,
        })
    }

    /// Run the initialize handshake
    pub async fn initialize(&mut self, timeout: Duration) -> Result<InitializeResult> {
        let params = InitializeParams {
            protocol_version: MCP_VERSION.to_string(),
            client_info: ClientInfo {
                name: CLIENT_NAME.to_string(),
                version: CLIENT_VERSION.to_string(),
            },
            capabilities: json!({}),
        };

        let params = serde_json::to_value(params)?;
        let result = self.request(methods::INITIALIZE, Some(params), timeout).await?;
        let result: InitializeResult = serde_json::from_value(result)?;

        self.notify(methods::INITIALIZED).await?;
        Ok(result)
    }

    /// Call a tool and wait for its result
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
        timeout: Duration,
    ) -> Result<CallToolResult> {
        let params = json!({"name": name, "arguments": arguments});
        let result = self.request(methods::CALL_TOOL, Some(params), timeout).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Send a request and wait for the response carrying the same id
    pub async fn request(
        &mut self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        self.next_id += 1;
        let id = RequestId::Number(self.next_id);

        self.post(&JsonRpcRequest::new(id.clone(), method, params)).await?;

        let events = &mut self.events;
        let response = tokio::time::timeout(timeout, async {
            while let Some(event) = events.recv().await {
                if event_kind(&event) != "message" {
                    continue;
                }
                match serde_json::from_str::<JsonRpcResponse>(&event.data) {
                    Ok(response) if response.id.as_ref() == Some(&id) => return Some(response),
                    Ok(response) => {
                        tracing::debug!(id = ?response.id, "Skipping unrelated response");
                    }
                    Err(e) => tracing::warn!(error = %e, "Malformed message event"),
                }
            }
            None
        })
        .await
        .map_err(|_| TransportError::Timeout {
            secs: timeout.as_secs(),
        })?
        .ok_or_else(|| TransportError::ConnectionClosed {
            message: "stream ended while waiting for response".to_string(),
        })?;

        match (response.result, response.error) {
            (_, Some(error)) => Err(McpError::ProtocolError {
                message: format!("{} ({})", error.message, error.code),
            }
            .into()),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }

    /// Send a notification (no response expected)
    pub async fn notify(&self, method: &str) -> Result<()> {
        self.post(&JsonRpcRequest::notification(method, None)).await
    }

    async fn post(&self, request: &JsonRpcRequest) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: response.status().as_u16(),
            }
            .into());
        }
        Ok(())
    }
}

/// Decode an SSE byte stream and forward each event until the receiver goes away
async fn forward_events<S, B, E>(body: S, tx: mpsc::Sender<Event>)
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let mut events = std::pin::pin!(body.eventsource());
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SSE stream failed");
                break;
            }
        }
    }
    tracing::debug!("SSE stream ended");
}

// An event without an `event:` field is a `message`.
fn event_kind(event: &Event) -> &str {
    if event.event.is_empty() {
        "message"
    } else {
        &event.event
    }
}

/// Tool arguments for one line of user input, or `None` when the line ends the session.
///
/// The command is sent as typed; only the line terminator has been stripped.
fn command_arguments(line: &str, session_id: &str) -> Option<Value> {
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return None;
    }
    Some(json!({"command": line, "session_id": session_id}))
}

impl Drop for SseClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Interactive loop: read commands from stdin and send them as ping-pong tool calls
pub async fn run_interactive(config: &Config) -> Result<()> {
    let timeout = config.call_timeout;

    let mut client = SseClient::connect(&config.sse_url, timeout).await?;
    client.initialize(timeout).await?;

    let session_id = Uuid::new_v4().to_string();
    tracing::info!(session_id = %session_id, "Starting interactive session");

    println!("Type a command (e.g., 'ping', 'pong', 'count') or 'exit' to quit:");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b">>> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(arguments) = command_arguments(&line, &session_id) else {
            break;
        };

        println!("Sending command: {}", line);

        match client.call_tool(PING_PONG_TOOL, arguments, timeout).await {
            Ok(result) => println!("Result: {}", result.first_text().unwrap_or_default()),
            Err(PingPongError::Transport(TransportError::Timeout { secs })) => {
                println!("No response received within {} seconds.", secs)
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}
