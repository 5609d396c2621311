//! Scout client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Scout API
#[derive(Debug, Error)]
pub enum ScoutError {
    /// HTTP transport error (connectivity, TLS, timeouts)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Scout reported a failure, either as an `errors` payload or a non-success status
    #[error("Scout API error: {0}")]
    Api(String),

    /// Requested server or resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required option or setting is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Response body was not well-formed XML
    #[error("XML error: {0}")]
    Xml(String),

    /// A parsed element did not match the expected record shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for ScoutError {
    fn from(err: quick_xml::Error) -> Self {
        ScoutError::Xml(err.to_string())
    }
}
