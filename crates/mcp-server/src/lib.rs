//! `sg-mcp`: server side of the Model Context Protocol over stdio.
//!
//! The crate knows nothing about schedules.  A front end implements
//! [`ToolHandler`] and hands it to [`McpServer`], which speaks
//! newline-delimited JSON-RPC 2.0 on any async reader/writer pair.
//!
//! ```rust,ignore
//! let server = McpServer::new(handler);
//! server.serve_stdio().await?;
//! ```

pub mod protocol;
pub mod server;

pub use protocol::{McpToolDef, ServerInfo, ToolCallContent, ToolCallResult, PROTOCOL_VERSION};
pub use server::{McpServer, McpServerError, ToolCallError, ToolHandler};
