//! MCP (Model Context Protocol) module
//!
//! Implements the MCP server protocol for tool and prompt invocation.

pub mod prompts;
pub mod server;
pub mod tools;
pub mod types;
