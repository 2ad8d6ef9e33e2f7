//! Error types for orbit propagation.

use thiserror::Error;

/// Errors raised while parsing or propagating an element set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// The element lines are malformed or describe an unusable orbit.
    #[error("Failed to parse element set: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// SGP4 reported an invalid orbit at the requested time.
    #[error("SGP4 propagation error: {message}")]
    Propagation {
        /// Human-readable SGP4 error.
        message: String,
    },
}
