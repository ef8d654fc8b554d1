//! SSE client
//!
//! Interactive command-line client for the SSE transport.

pub mod sse;

pub use sse::{run_interactive, SseClient};
