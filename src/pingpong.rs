//! Ping-pong command handling
//!
//! Interprets a command string against a session in the store.

use std::fmt;

use crate::session::SessionStore;

/// Reply for commands that are not recognised
pub const UNKNOWN_COMMAND: &str = "unknown command";

/// A ping-pong command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Pong,
    Count,
    Unknown(String),
}

impl Command {
    /// Parse a command; matching is exact and case-sensitive
    pub fn parse(input: &str) -> Self {
        match input {
            "ping" => Command::Ping,
            "pong" => Command::Pong,
            "count" => Command::Count,
            other => Command::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Ping => f.write_str("ping"),
            Command::Pong => f.write_str("pong"),
            Command::Count => f.write_str("count"),
            Command::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Outcome of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text returned to the caller
    pub text: String,

    /// Session the command ran against
    pub session_id: String,
}

/// Run `command` against `session_id`, creating the session first if needed
pub fn execute(store: &SessionStore, command: &str, session_id: Option<&str>) -> Reply {
    let session_id = store.get_or_create(session_id);

    let text = match Command::parse(command) {
        Command::Ping => {
            store.increment(&session_id);
            "pong".to_string()
        }
        Command::Pong => {
            store.increment(&session_id);
            "ping".to_string()
        }
        Command::Count => store.get_count(&session_id).to_string(),
        Command::Unknown(raw) => {
            tracing::debug!(command = %raw, session_id = %session_id, "Unknown command");
            UNKNOWN_COMMAND.to_string()
        }
    };

    Reply { text, session_id }
}
