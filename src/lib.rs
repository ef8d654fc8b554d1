//! Ping-Pong MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing a `ping-pong` tool backed by
//! per-session counters, served over stdio, plain HTTP and SSE.

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod pingpong;
pub mod session;
pub mod transport;

pub use config::Config;
pub use error::{PingPongError, Result};
pub use session::SessionStore;
