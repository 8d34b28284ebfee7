//! Nomi MCP Server
//!
//! A Model Context Protocol server that exposes the Nomi API to agent hosts
//! like Claude Desktop.
//!
//! # Usage
//!
//! ```bash
//! NOMI_API_KEY=... nomi-mcp [--base-url <url>] [--api-key-env <var>]
//! ```
//!
//! # Environment Variables
//!
//! - `NOMI_API_KEY`: API key, read on every tool call (not at startup)
//! - `NOMI_API_BASE_URL`: Override the API endpoint
//! - `RUST_LOG`: Control log verbosity (default: `nomi_mcp=info`)
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use clap::Parser;
use nomi_api::DEFAULT_BASE_URL;
use nomi_mcp::{CredentialSource, DEFAULT_API_KEY_ENV, NomiMcpServer, ServerConfig};

/// MCP server for the Nomi API
#[derive(Parser)]
#[command(name = "nomi-mcp")]
#[command(about = "MCP server for the Nomi API")]
#[command(version)]
struct Args {
    /// Base URL of the Nomi API
    #[arg(long, env = "NOMI_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Environment variable that holds the API key
    #[arg(long, default_value = DEFAULT_API_KEY_ENV)]
    api_key_env: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nomi_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!(base_url = %args.base_url, api_key_env = %args.api_key_env, "Starting nomi-mcp server");

    let config = ServerConfig {
        base_url: args.base_url,
        credentials: CredentialSource::Env(args.api_key_env),
    };

    if let Err(e) = serve(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> nomi_mcp::Result<()> {
    NomiMcpServer::new(config)?.run().await
}
