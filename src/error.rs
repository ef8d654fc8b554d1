//! Error types for the ping-pong MCP server
//!
//! The session store itself never fails; these cover configuration,
//! protocol and transport faults around it.

use thiserror::Error;

/// Main error type for the ping-pong MCP server
#[derive(Error, Debug)]
pub enum PingPongError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// Transport errors (HTTP, SSE, stdio)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidEnvVar { var: String, value: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Unknown prompt: {name}")]
    UnknownPrompt { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },
}

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to bind {addr}: {message}")]
    BindFailed { addr: String, message: String },

    #[error("Server error: {message}")]
    ServerFailed { message: String },

    #[error("Connection closed: {message}")]
    ConnectionClosed { message: String },

    #[error("Unexpected response status: {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Invalid endpoint: {endpoint}")]
    InvalidEndpoint { endpoint: String },

    #[error("No response received within {secs} seconds")]
    Timeout { secs: u64 },
}

/// Result type alias for ping-pong operations
pub type Result<T> = std::result::Result<T, PingPongError>;
