//! Integration tests for the Ping-Pong MCP Server
//!
//! Drive the session store, the MCP message handler and the HTTP/SSE routers
//! in-process. The SSE client tests serve the router on a loopback port.

use std::sync::Arc;

use serde_json::{json, Value};

use ping_pong_mcp::session::SessionStore;

/// Helper to create a JSON-RPC request
fn make_request(id: i64, method: &str, params: Option<Value>) -> Value {
    let mut request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        request["params"] = p;
    }
    request
}

fn ping_pong_call(id: i64, command: &str, session_id: &str) -> Value {
    make_request(
        id,
        "tools/call",
        Some(json!({
            "name": "ping-pong",
            "arguments": {"command": command, "session_id": session_id}
        })),
    )
}

mod session_store_tests {
    use super::*;

    #[test]
    fn test_end_to_end_scenario() {
        let store = SessionStore::new();
        assert_eq!(store.get_or_create(Some("abc")), "abc");
        assert_eq!(store.increment("abc"), 1);
        assert_eq!(store.increment("abc"), 2);
        assert_eq!(store.get_count("abc"), 2);
        assert_eq!(store.get_count("xyz"), 0);
    }

    #[test]
    fn test_n_increments() {
        let store = SessionStore::new();
        for n in [0u64, 1, 7, 50] {
            let id = format!("session-{}", n);
            store.get_or_create(Some(&id));
            for _ in 0..n {
                store.increment(&id);
            }
            assert_eq!(store.get_count(&id), n);
        }
    }

    #[test]
    fn test_unknown_increment_does_not_create() {
        let store = SessionStore::new();
        assert_eq!(store.increment("ghost"), 0);
        assert_eq!(store.get_count("ghost"), 0);
        assert!(!store.contains("ghost"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_generated_ids_unique() {
        let store = SessionStore::new();
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| store.get_or_create(None)).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn test_concurrent_tasks_no_lost_updates() {
        let store = Arc::new(SessionStore::new());
        let id = store.get_or_create(Some("shared"));

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move { store.increment(&id) })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        assert_eq!(store.get_count(&id), 64);
        results.sort_unstable();
        assert_eq!(results, (1..=64).collect::<Vec<u64>>());
    }
}

mod mcp_protocol_tests {
    use super::*;
    use ping_pong_mcp::mcp::server::McpServer;
    use ping_pong_mcp::mcp::types::CallToolResult;

    fn send(server: &McpServer, request: &Value) -> Value {
        let response = tokio_test::block_on(server.handle_message(&request.to_string()))
            .unwrap()
            .expect("expected a response");
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_list_tools() {
        let server = McpServer::new(Arc::new(SessionStore::new()));
        let response = send(&server, &make_request(1, "tools/list", None));
        assert_eq!(response["result"]["tools"][0]["name"], "ping-pong");
        assert!(response["result"]["tools"][0]["inputSchema"]["properties"]["command"].is_object());
    }

    #[test]
    fn test_list_prompts() {
        let server = McpServer::new(Arc::new(SessionStore::new()));
        let response = send(&server, &make_request(1, "prompts/list", None));
        assert_eq!(response["result"]["prompts"][0]["name"], "ping-pong");
    }

    #[test]
    fn test_command_sequence() {
        let server = McpServer::new(Arc::new(SessionStore::new()));
        let replies: Vec<String> = ["ping", "ping", "count"]
            .iter()
            .enumerate()
            .map(|(i, command)| {
                let response = send(&server, &ping_pong_call(i as i64, command, "fresh"));
                let result: CallToolResult =
                    serde_json::from_value(response["result"].clone()).unwrap();
                result.first_text().unwrap().to_string()
            })
            .collect();
        assert_eq!(replies, vec!["pong", "pong", "2"]);
    }

    #[test]
    fn test_servers_share_store() {
        let store = Arc::new(SessionStore::new());
        let a = McpServer::new(store.clone());
        let b = McpServer::new(store.clone());

        send(&a, &ping_pong_call(1, "ping", "shared"));
        send(&b, &ping_pong_call(1, "pong", "shared"));
        assert_eq!(store.get_count("shared"), 2);
    }

    #[test]
    fn test_unknown_command() {
        let server = McpServer::new(Arc::new(SessionStore::new()));
        let response = send(&server, &ping_pong_call(1, "hello", "s"));
        assert_eq!(response["result"]["content"][0]["text"], "unknown command");
    }

    #[test]
    fn test_jsonrpc_error_response_structure() {
        let server = McpServer::new(Arc::new(SessionStore::new()));
        let response = send(&server, &make_request(9, "unknown", None));
        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], 9);
        assert!(response["result"].is_null());
        assert_eq!(response["error"]["code"], -32601);
    }
}

mod http_api_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    use ping_pong_mcp::transport::http::router;

    async fn call(app: &Router, request: Request<Body>) -> Value {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(body: Value) -> Request<Body> {
        Request::post("/ping-pong")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_command_sequence_shares_session() {
        let store = Arc::new(SessionStore::new());
        let app = router(store.clone());

        let first = call(&app, post(json!({"command": "ping"}))).await;
        assert_eq!(first["data"], "pong");
        let session_id = first["session_id"].as_str().unwrap().to_string();

        let second = call(&app, post(json!({"command": "pong", "session_id": session_id}))).await;
        assert_eq!(second["data"], "ping");
        assert_eq!(second["session_id"], session_id.as_str());

        let count = call(&app, post(json!({"command": "count", "session_id": session_id}))).await;
        assert_eq!(count["data"], "2");
        assert_eq!(store.get_count(&session_id), 2);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = router(Arc::new(SessionStore::new()));
        let request = Request::post("/ping-pong")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = call(&app, request).await;
        assert!(response["error"].is_string());
        assert!(response["session_id"].is_null());
    }

    #[tokio::test]
    async fn test_bad_command_type_keeps_session() {
        let app = router(Arc::new(SessionStore::new()));
        let response = call(&app, post(json!({"command": 5, "session_id": "abc"}))).await;
        assert!(response["error"].is_string());
        assert_eq!(response["session_id"], "abc");
    }

    #[tokio::test]
    async fn test_get_prompt() {
        let app = router(Arc::new(SessionStore::new()));
        let request = Request::get("/ping-pong?prompt_name=ping-pong")
            .body(Body::empty())
            .unwrap();

        let response = call(&app, request).await;
        assert_eq!(response["prompt"], "ping-pong");
        assert_eq!(response["description"], "Prompt for the ping-pong tool");
        assert!(response["content"].as_str().unwrap().contains("ping-pong tool"));
    }

    #[tokio::test]
    async fn test_get_prompt_errors() {
        let app = router(Arc::new(SessionStore::new()));

        let missing = call(&app, Request::get("/ping-pong").body(Body::empty()).unwrap()).await;
        assert_eq!(missing["error"], "prompt_name is required");

        let unknown = call(
            &app,
            Request::get("/ping-pong?prompt_name=other")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(unknown["error"], "Prompt not found");
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let app = router(Arc::new(SessionStore::new()));
        let request = Request::get("/health")
            .header("origin", "http://example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}

mod sse_transport_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use eventsource_stream::{Event, Eventsource};
    use futures_util::{Stream, StreamExt};
    use tower::ServiceExt;

    use ping_pong_mcp::transport::sse::{router, STREAM_PATH};

    async fn next_event<S, E>(events: &mut S) -> Event
    where
        S: Stream<Item = Result<Event, E>> + Unpin,
        E: std::fmt::Debug,
    {
        events.next().await.expect("stream ended").unwrap()
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = Arc::new(SessionStore::new());
        let app = router(store.clone());

        let response = app
            .clone()
            .oneshot(Request::get(STREAM_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut events = Box::pin(response.into_body().into_data_stream().eventsource());

        let endpoint = next_event(&mut events).await;
        assert_eq!(endpoint.event, "endpoint");
        assert!(endpoint.data.starts_with("/sse-transport?session_id="));

        let status = app
            .clone()
            .oneshot(
                Request::post(endpoint.data.as_str())
                    .header("content-type", "application/json")
                    .body(Body::from(ping_pong_call(1, "ping", "abc").to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status();
        assert_eq!(status, StatusCode::ACCEPTED);

        let message = next_event(&mut events).await;
        assert_eq!(message.event, "message");
        let response: Value = serde_json::from_str(&message.data).unwrap();
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["content"][0]["text"], "pong");
        assert_eq!(store.get_count("abc"), 1);
    }

    #[tokio::test]
    async fn test_unparseable_message() {
        let app = router(Arc::new(SessionStore::new()));

        let response = app
            .clone()
            .oneshot(Request::get(STREAM_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let mut events = Box::pin(response.into_body().into_data_stream().eventsource());
        let endpoint = next_event(&mut events).await;

        let status = app
            .oneshot(
                Request::post(endpoint.data.as_str())
                    .body(Body::from("{broken"))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod sse_client_tests {
    use super::*;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::response::sse::{Event, Sse};
    use axum::routing::{get, post};
    use axum::Router;
    use futures_util::{Stream, StreamExt};

    use ping_pong_mcp::client::SseClient;
    use ping_pong_mcp::error::{PingPongError, TransportError};
    use ping_pong_mcp::mcp::tools::PING_PONG_TOOL;
    use ping_pong_mcp::transport::sse::router;

    async fn spawn_server(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_ping_over_sse() {
        let store = Arc::new(SessionStore::new());
        let addr = spawn_server(router(store.clone())).await;
        let timeout = Duration::from_secs(5);

        let mut client = SseClient::connect(&format!("http://{}/sse", addr), timeout)
            .await
            .unwrap();

        let init = client.initialize(timeout).await.unwrap();
        assert_eq!(init.server_info.name, "ping-pong");

        let result = client
            .call_tool(
                PING_PONG_TOOL,
                json!({"command": "ping", "session_id": "abc"}),
                timeout,
            )
            .await
            .unwrap();
        assert_eq!(result.first_text(), Some("pong"));

        let result = client
            .call_tool(
                PING_PONG_TOOL,
                json!({"command": " ping", "session_id": "abc"}),
                timeout,
            )
            .await
            .unwrap();
        assert_eq!(result.first_text(), Some("unknown command"));
        assert_eq!(store.get_count("abc"), 1);
    }

    // Announces an endpoint and one unrelated response, then stays silent.
    async fn silent_stream() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let events = futures_util::stream::iter(vec![
            Ok(Event::default().event("endpoint").data("/sse-transport")),
            Ok(Event::default()
                .event("message")
                .data(r#"{"jsonrpc":"2.0","id":999,"result":{}}"#)),
        ])
        .chain(futures_util::stream::pending());
        Sse::new(events)
    }

    #[tokio::test]
    async fn test_call_times_out_without_reply() {
        let app = Router::new()
            .route("/sse", get(silent_stream))
            .route("/sse-transport", post(|| async { StatusCode::ACCEPTED }));
        let addr = spawn_server(app).await;

        let mut client = SseClient::connect(&format!("http://{}/sse", addr), Duration::from_secs(5))
            .await
            .unwrap();

        let err = client
            .call_tool(
                PING_PONG_TOOL,
                json!({"command": "ping", "session_id": "abc"}),
                Duration::from_millis(200),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PingPongError::Transport(TransportError::Timeout { .. })
        ));
    }
}
