//! MCP Server for the Nomi API
//!
//! This crate exposes the Nomi conversational AI service via the Model Context
//! Protocol (MCP), so agent hosts (Claude Desktop, IDEs) can chat with Nomis
//! and manage group rooms.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (Claude/IDE) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ nomi-mcp (MCP Server) ]
//!        |  tools.rs     - tool catalog
//!        |  handlers.rs  - tool -> request translation, error envelopes
//!        v
//! [ nomi-api (HTTP client) ]
//!        | (HTTPS)
//!        v
//! [ api.nomi.ai/v1 ]
//! ```
//!
//! # Tools
//!
//! - Nomis: list, get, chat, avatar
//! - Rooms: list, create, get, update, delete, chat, request a Nomi message
//!
//! Every tool call yields exactly one result. Failures (missing arguments,
//! missing API key, unknown tool, API errors, cancellation) are returned as
//! `isError: true` results with an `Error: ...` message.

pub mod config;
pub mod error;
pub mod handlers;
pub mod patch;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::{CredentialSource, DEFAULT_API_KEY_ENV, ServerConfig};
pub use error::{Error, Result};
pub use handlers::{Dispatcher, RoomUpdate};
pub use patch::Patch;
pub use server::NomiMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
