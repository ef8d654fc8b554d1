//! MCP prompt definitions
//!
//! Static prompts registered alongside the ping-pong tool.

use crate::error::{McpError, Result};
use crate::mcp::types::{Content, GetPromptResult, Prompt, PromptMessage, Role};

/// Name of the ping-pong prompt
pub const PING_PONG_PROMPT: &str = "ping-pong";

const PING_PONG_DESCRIPTION: &str = "Prompt for the ping-pong tool";

const PING_PONG_CONTENT: &str =
    "This is a simple ping-pong tool. Use 'ping' or 'pong' to interact.";

/// Registry of the prompts this server exposes
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry;

impl PromptRegistry {
    pub fn new() -> Self {
        Self
    }

    /// List all available prompts
    pub fn list_prompts(&self) -> Vec<Prompt> {
        vec![Prompt {
            name: PING_PONG_PROMPT.to_string(),
            description: Some(PING_PONG_DESCRIPTION.to_string()),
        }]
    }

    /// Render a prompt by name
    pub fn get_prompt(&self, name: &str) -> Result<GetPromptResult> {
        match name {
            PING_PONG_PROMPT => Ok(GetPromptResult {
                description: Some(PING_PONG_DESCRIPTION.to_string()),
                messages: vec![PromptMessage {
                    role: Role::User,
                    content: Content::text(PING_PONG_CONTENT),
                }],
            }),
            _ => Err(McpError::UnknownPrompt {
                name: name.to_string(),
            }
            .into()),
        }
    }
}
