//! Error types for upstream API calls.

use thiserror::Error;

/// Errors that can occur while talking to an upstream API.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status.
    #[error("{service} API error {status}: {body}")]
    Status {
        /// Which API answered.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Raw response body, for logs only.
        body: String,
    },

    /// The requested resource does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API answered but reported `success: false`.
    #[error("{0} rejected the request")]
    Rejected(&'static str),

    /// The response body did not have the expected shape.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// A client could not be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl UpstreamError {
    /// Returns true if the upstream definitively said the resource is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::NotFound(_))
    }
}

/// Result type for upstream operations.
pub type Result<T> = std::result::Result<T, UpstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Status {
            service: "CoinGecko",
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "CoinGecko API error 429: rate limited");

        let err = UpstreamError::Rejected("create-order");
        assert_eq!(err.to_string(), "create-order rejected the request");
    }

    #[test]
    fn test_is_not_found() {
        assert!(UpstreamError::NotFound("Atlantis".into()).is_not_found());
        assert!(!UpstreamError::Rejected("submit-code").is_not_found());
    }
}
