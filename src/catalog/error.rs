//! Error types for Space-Track catalog operations.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while talking to the catalog service.
///
/// None of the variants carry credentials; authentication failures only
/// describe the outcome.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Credentials were rejected or the login request could not be sent.
    #[error("Space-Track authentication failed: {message}")]
    Authentication {
        /// Description of what went wrong.
        message: String,
    },

    /// The service answered with a non-success HTTP status.
    #[error("Request failed with status {status}: {body}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the service.
        body: String,
    },

    /// The connection failed or timed out.
    #[error("Failed to reach Space-Track: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// A JSON response could not be decoded.
    #[error("Failed to decode JSON from Space-Track response: {message}")]
    Decode {
        /// Decoder error message.
        message: String,
    },

    /// A JSON record lacks the fields of an element set.
    #[error("Invalid element set record: {message}")]
    InvalidRecord {
        /// Description of what's missing.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_includes_status_and_body() {
        let error = CatalogError::Request {
            status: 500,
            body: "Internal Server Error".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn authentication_error_display() {
        let error = CatalogError::Authentication {
            message: "status 401".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Space-Track authentication failed: status 401"
        );
    }
}
