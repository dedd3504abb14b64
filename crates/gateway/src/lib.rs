//! `sg-gateway`: the `schedgen` binary's library half.
//!
//! Wires the schedule pipeline, the XLSX renderer and the artifact registry
//! behind two front ends: an axum HTTP API and an MCP stdio tool server.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod mcp;
pub mod render;
pub mod service;
pub mod state;
