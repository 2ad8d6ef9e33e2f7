//! Error types for spacetrack-mcp configuration and startup.
//!
//! # Security Note
//!
//! Error messages are carefully crafted to NEVER include credentials.
//! Variants that relate to credentials only name the environment variable,
//! never its value.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },

    /// An environment file could not be read or parsed.
    #[error("failed to load environment file {path}: {message}")]
    EnvFileError {
        /// Path to the environment file.
        path: PathBuf,
        /// Description of the failure. Never includes values.
        message: String,
    },

    /// A required credential is not set in the environment.
    #[error("environment variable {variable} must be set")]
    MissingCredential {
        /// Name of the missing environment variable.
        variable: &'static str,
    },
}
