//! HTTP transports
//!
//! Axum routers exposing the ping-pong tool as plain HTTP endpoints and as an
//! MCP SSE transport, plus the shared listener bootstrap.

pub mod http;
pub mod sse;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{Result, TransportError};

/// CORS policy applied to every HTTP transport: any origin, method and header
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind `addr` and serve `app` until ctrl-c
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        TransportError::BindFailed {
            addr: addr.to_string(),
            message: e.to_string(),
        }
    })?;

    tracing::info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TransportError::ServerFailed {
            message: e.to_string(),
        })?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
