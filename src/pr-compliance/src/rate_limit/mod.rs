//! Rate limiting decisions for GitHub API responses.
//!
//! When GitHub throttles a request (HTTP 403 or 429) the response headers say
//! how long to back off. [`RateLimiter`] turns those headers into a
//! [`RetryDecision`]; it never sleeps itself, the fetcher does.

mod info;

pub use info::{RateLimitInfo, LIMIT_HEADER, REMAINING_HEADER, RESET_HEADER};

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Header carrying the server-requested back-off in seconds.
pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Outcome of inspecting a throttled response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the duration, then retry the same request.
    Wait(Duration),

    /// The response carries no usable rate-limit metadata; do not retry.
    NotApplicable,
}

/// Decides how long to wait before retrying a throttled request.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    safety_margin: Duration,
}

impl RateLimiter {
    /// Creates a limiter that pads every wait with `safety_margin`.
    #[must_use]
    pub fn new(safety_margin: Duration) -> Self {
        Self { safety_margin }
    }

    /// Returns the padding added to every wait.
    #[must_use]
    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    /// Decides whether and how long to wait, given the response headers and
    /// the current Unix time in seconds.
    ///
    /// `Retry-After` wins over the `x-ratelimit-*` headers. A reset time in
    /// the past yields the bare safety margin.
    #[must_use]
    pub fn decide(&self, headers: &HeaderMap, now: u64) -> RetryDecision {
        if let Some(retry_after) = info::header_u64(headers, RETRY_AFTER_HEADER) {
            return RetryDecision::Wait(Duration::from_secs(retry_after) + self.safety_margin);
        }

        let info = RateLimitInfo::from_headers(headers);
        match (info.is_exhausted(), info.reset) {
            (true, Some(reset)) => {
                let until_reset = reset.saturating_sub(now);
                RetryDecision::Wait(Duration::from_secs(until_reset) + self.safety_margin)
            }
            _ => RetryDecision::NotApplicable,
        }
    }

    /// Same as [`RateLimiter::decide`] using the system clock.
    #[must_use]
    pub fn decide_now(&self, headers: &HeaderMap) -> RetryDecision {
        self.decide(headers, unix_now())
    }
}

/// Current Unix time in seconds, zero if the clock is before the epoch.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
