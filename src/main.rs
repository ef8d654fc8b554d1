//! Ping-Pong MCP Server - Rust Implementation
//!
//! Serves the `ping-pong` tool over stdio, plain HTTP or SSE, and ships an
//! interactive client for the SSE transport.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use ping_pong_mcp::client;
use ping_pong_mcp::config::Config;
use ping_pong_mcp::error::Result;
use ping_pong_mcp::mcp::server::McpServer;
use ping_pong_mcp::session::SessionStore;
use ping_pong_mcp::transport;

/// Ping-Pong MCP Server
#[derive(Parser)]
#[command(name = "ping-pong-mcp")]
#[command(author, version, about = "Ping-Pong MCP Server - a toy Model Context Protocol tool server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Stdio,

    /// Serve the plain HTTP API
    Api {
        #[command(flatten)]
        bind: BindArgs,

        /// Also serve MCP over stdio, sharing the same sessions
        #[arg(long)]
        with_stdio: bool,
    },

    /// Serve MCP over Server-Sent Events
    Sse {
        #[command(flatten)]
        bind: BindArgs,
    },

    /// Interactive client for the SSE transport
    Client {
        /// SSE endpoint URL
        #[arg(long)]
        url: Option<String>,

        /// Seconds to wait for each response
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Args)]
struct BindArgs {
    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to
    #[arg(long)]
    port: Option<u16>,
}

impl BindArgs {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::new()?;

    let store = Arc::new(SessionStore::new());

    match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => {
            McpServer::new(store).run_stdio().await?;
        }
        Commands::Api { bind, with_stdio } => {
            bind.apply(&mut config);
            let addr = config.bind_addr()?;
            let app = transport::http::router(store.clone());

            if with_stdio {
                let mcp = McpServer::new(store);
                tokio::try_join!(transport::serve(addr, app), mcp.run_stdio())?;
            } else {
                transport::serve(addr, app).await?;
            }
        }
        Commands::Sse { bind } => {
            bind.apply(&mut config);
            let addr = config.bind_addr()?;
            transport::serve(addr, transport::sse::router(store)).await?;
        }
        Commands::Client { url, timeout } => {
            if let Some(url) = url {
                config.sse_url = url;
            }
            if let Some(secs) = timeout {
                config.call_timeout = Duration::from_secs(secs);
            }
            client::run_interactive(&config).await?;
        }
    }

    Ok(())
}
