//! Glances tool server — Glances monitoring agents exposed as MCP tools
//!
//! Every tool call resolves a server from the session's registry, issues one
//! request against the agent's REST API and renders the answer as a
//! fixed-template text report:
//! resolve server → fetch snapshot → format report.

pub mod catalog;
pub mod client;
pub mod config;
pub mod format;
pub mod handlers;
pub mod mcp;
pub mod registry;
