//! Rate limit information.

use http::HeaderMap;

/// Header carrying the quota size of the current window.
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Header carrying the requests left in the current window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the reset time as a UTC epoch second.
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limit information read from a response.
///
/// Each field is `None` when the header is absent or not an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: Option<u64>,

    /// Unix timestamp when the rate limit resets.
    pub reset: Option<u64>,

    /// Total requests allowed per window.
    pub limit: Option<u64>,
}

impl RateLimitInfo {
    /// Reads the `x-ratelimit-*` headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: header_u64(headers, REMAINING_HEADER),
            reset: header_u64(headers, RESET_HEADER),
            limit: header_u64(headers, LIMIT_HEADER),
        }
    }

    /// Returns true if the quota is known to be used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Parses a header value as an unsigned integer.
pub(crate) fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}
