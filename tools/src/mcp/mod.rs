//! Model Context Protocol adapter over stdio

pub mod framing;
pub mod jsonrpc;
pub mod server;

pub use server::McpServer;
