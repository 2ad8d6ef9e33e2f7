//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes Space-Track element set queries and SGP4 propagation as tools to
//! AI assistants. The server communicates over stdio using newline-delimited
//! JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │   │  Transport  │───▶│   Server    │───▶│   Tools     │      │
//! │   │   (lines)   │    │ (lifecycle) │    │  (shaping)  │      │
//! │   └─────────────┘    └─────────────┘    └─────────────┘      │
//! │                             │                  │             │
//! │                             ▼                  ▼             │
//! │                      ┌─────────────┐    ┌─────────────┐      │
//! │                      │   Catalog   │    │ Propagation │      │
//! │                      │(Space-Track)│    │   (SGP4)    │      │
//! │                      └─────────────┘    └─────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2025-06-18 and accepts
//! clients speaking 2025-03-26 or 2024-11-05.

pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use tools::{ToolCallResult, GET_TLES, PROPAGATE_SATELLITE_POSITION};
pub use transport::LineTransport;
