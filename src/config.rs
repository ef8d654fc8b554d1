//! Configuration management for the ping-pong MCP server
//!
//! Reads bind address, client URL and call timeout from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default bind host for the HTTP transports
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port for the HTTP transports
pub const DEFAULT_PORT: u16 = 8080;

/// Default SSE endpoint the client connects to
pub const DEFAULT_SSE_URL: &str = "http://localhost:8080/sse";

/// Default per-call timeout for the client, in seconds
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 5;

/// Configuration for the ping-pong MCP server
#[derive(Debug, Clone)]
pub struct Config {
    /// Host the HTTP/SSE transports bind to
    pub host: String,

    /// Port the HTTP/SSE transports bind to
    pub port: u16,

    /// SSE endpoint used by the client
    pub sse_url: String,

    /// How long the client waits for a tool response
    pub call_timeout: Duration,
}

impl Config {
    /// Create a new configuration from environment variables, falling back to defaults
    pub fn new() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("PING_PONG_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PING_PONG_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnvVar {
                var: "PING_PONG_PORT".to_string(),
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let sse_url = lookup("PING_PONG_SSE_URL").unwrap_or_else(|| DEFAULT_SSE_URL.to_string());

        let call_timeout_secs = match lookup("PING_PONG_CALL_TIMEOUT_SECS") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnvVar {
                var: "PING_PONG_CALL_TIMEOUT_SECS".to_string(),
                value,
            })?,
            None => DEFAULT_CALL_TIMEOUT_SECS,
        };

        Ok(Self {
            host,
            port,
            sse_url,
            call_timeout: Duration::from_secs(call_timeout_secs),
        })
    }

    /// Resolve the socket address the transports listen on
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>().map_err(|_| {
            ConfigError::InvalidConfig {
                message: format!("invalid bind address: {}", addr),
            }
            .into()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sse_url: DEFAULT_SSE_URL.to_string(),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}
