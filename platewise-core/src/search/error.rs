use std::time::Duration;

use thiserror::Error;

/// Errors from [`crate::search::PlaceSearch::search`].
///
/// URLs carried by the variants never include the API key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceSearchError {
    /// The request could not be sent or the connection failed.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Request URL with the API key redacted.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Request URL with the API key redacted.
        url: String,
        /// Configured request timeout.
        timeout: Duration,
    },
    /// The service answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}: {message}")]
    Http {
        /// Request URL with the API key redacted.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body excerpt or reason phrase.
        message: String,
    },
    /// The service answered 200 but reported a failure status.
    #[error("place service at {url} reported {status}: {message}")]
    Service {
        /// Request URL with the API key redacted.
        url: String,
        /// Service status code, for example `REQUEST_DENIED`.
        status: String,
        /// Error message supplied by the service, if any.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse response from {url}: {message}")]
    Parse {
        /// Request URL with the API key redacted.
        url: String,
        /// Decoder error description.
        message: String,
    },
    /// The service kept returning continuation tokens past the page bound.
    #[error("nearby search exceeded {max_pages} pages")]
    PageLimitExceeded {
        /// Configured page bound.
        max_pages: usize,
    },
}
