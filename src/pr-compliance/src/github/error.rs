//! Fetch error types.

use http::StatusCode;
use thiserror::Error;

/// Errors that end a paginated fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be turned into a request URI.
    #[error("Invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The request never produced a response (DNS, connect, reset, timeout).
    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: octocrab::Error,
    },

    /// Throttled without `Retry-After` or an exhausted quota with a reset time.
    #[error("Throttled with HTTP {status} at '{url}' and no usable rate-limit headers")]
    Throttled { url: String, status: StatusCode },

    /// Any other non-200 status.
    #[error("Unexpected HTTP {status} from '{url}'")]
    UnexpectedStatus { url: String, status: StatusCode },

    /// The response body was not JSON.
    #[error("Invalid JSON payload from '{url}': {source}")]
    Payload {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A list endpoint answered with something other than a JSON array.
    #[error("Expected a JSON array from '{url}', got {kind}")]
    NotAList { url: String, kind: &'static str },
}

impl FetchError {
    /// Returns the URL of the request that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Transport { url, .. }
            | Self::Throttled { url, .. }
            | Self::UnexpectedStatus { url, .. }
            | Self::Payload { url, .. }
            | Self::NotAList { url, .. } => url,
        }
    }
}
