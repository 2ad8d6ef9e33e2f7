//! spacetrack-mcp: MCP server for Space-Track orbital data
//!
//! This library lets AI assistants retrieve two-line element sets (TLEs)
//! from the Space-Track.org catalog and propagate them with SGP4.
//!
//! # Architecture
//!
//! The server keeps one authenticated Space-Track session for its lifetime
//! and exposes two tools:
//!
//! - **`get_tles`**: Filtered element set queries in JSON, TLE, XML or CSV
//! - **`propagate_satellite_position`**: Position and velocity of a satellite
//!   at a given UTC time, from its most recent element set
//!
//! # Modules
//!
//! - [`catalog`] — Space-Track session, query building and records
//! - [`config`] — Configuration loading, validation and credentials
//! - [`error`] — Configuration error types
//! - [`mcp`] — MCP protocol implementation
//! - [`propagation`] — SGP4 propagation

pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod propagation;
