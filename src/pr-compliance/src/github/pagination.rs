//! Paginated GET requests with rate-limit retries.

use super::client::build_client;
use super::FetchError;
use crate::config::Settings;
use crate::rate_limit::{RateLimitInfo, RateLimiter, RetryDecision};
use http::header::{HeaderMap, HeaderValue, ACCEPT, LINK};
use http::{StatusCode, Uri};
use octocrab::Octocrab;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Media type GitHub recommends for REST calls.
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Pages collected by [`PaginatedFetcher::fetch`].
///
/// `failure` is set when the fetch stopped early; `pages` still holds every
/// page received before that point.
#[derive(Debug, Default)]
pub struct Pages {
    /// Parsed payloads in link order.
    pub pages: Vec<Value>,

    /// URL each entry of `pages` was fetched from.
    pub sources: Vec<Url>,

    /// Why the fetch stopped early, if it did.
    pub failure: Option<FetchError>,
}

impl Pages {
    /// Returns true if every page up to the last `next` link was fetched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Flattens array payloads into their elements.
    ///
    /// A non-array payload ends the walk: items from earlier pages are kept
    /// and the returned failure is [`FetchError::NotAList`] for that page.
    pub fn into_items(self) -> (Vec<Value>, Option<FetchError>) {
        let mut items = Vec::new();
        for (page, source) in self.pages.into_iter().zip(self.sources) {
            match page {
                Value::Array(elements) => items.extend(elements),
                other => {
                    let kind = json_kind(&other);
                    warn!(url = %source, kind, "Page payload is not a list");
                    return (
                        items,
                        Some(FetchError::NotAList {
                            url: source.to_string(),
                            kind,
                        }),
                    );
                }
            }
        }
        (items, self.failure)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One successfully fetched page.
struct Page {
    payload: Value,
    next: Option<Url>,
}

/// Issues GET requests and walks `rel="next"` links.
///
/// Requests run strictly one after another. A throttled request (HTTP 403 or
/// 429) is retried after the wait chosen by the [`RateLimiter`], as many times
/// as it takes.
#[derive(Clone)]
pub struct PaginatedFetcher {
    octocrab: Octocrab,
    rate_limiter: RateLimiter,
    api_base: Url,
    per_page: u8,
}

impl PaginatedFetcher {
    /// Creates a fetcher from its parts.
    #[must_use]
    pub fn new(octocrab: Octocrab, rate_limiter: RateLimiter, api_base: Url, per_page: u8) -> Self {
        Self {
            octocrab,
            rate_limiter,
            api_base,
            per_page,
        }
    }

    /// Builds a fetcher from run settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the base URL is invalid or the client cannot
    /// be built.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let api_base = Url::parse(&settings.api_base_url).map_err(|e| FetchError::InvalidUrl {
            url: settings.api_base_url.clone(),
            message: e.to_string(),
        })?;
        let octocrab = build_client(&api_base)?;
        Ok(Self::new(
            octocrab,
            RateLimiter::new(settings.safety_margin()),
            api_base,
            settings.per_page,
        ))
    }

    /// Returns the API root requests are built against.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Returns the page size list endpoints should ask for.
    #[must_use]
    pub fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Fetches `url` and every page linked from it.
    ///
    /// `params` are added to the first request only; `next` links already
    /// carry the query. `headers` are merged over the default `Accept` header.
    pub async fn fetch(
        &self,
        mut url: Url,
        params: &[(&str, &str)],
        headers: Option<HeaderMap>,
    ) -> Pages {
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut request_headers = HeaderMap::new();
        request_headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        if let Some(extra) = headers {
            for (name, value) in extra.iter() {
                request_headers.insert(name.clone(), value.clone());
            }
        }

        let mut pages = Pages::default();
        let mut next = Some(url);

        while let Some(current) = next.take() {
            match self.fetch_page(&current, &request_headers).await {
                Ok(page) => {
                    debug!(url = %current, page = pages.pages.len() + 1, "Fetched page");
                    pages.pages.push(page.payload);
                    pages.sources.push(current);
                    next = page.next;
                }
                Err(e) => {
                    warn!(url = %current, error = %e, "Fetch stopped");
                    pages.failure = Some(e);
                }
            }
        }

        pages
    }

    /// Fetches a single page, waiting out rate limits.
    async fn fetch_page(&self, url: &Url, headers: &HeaderMap) -> Result<Page, FetchError> {
        let uri: Uri = url.as_str().parse().map_err(|e: http::uri::InvalidUri| {
            FetchError::InvalidUrl {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let response = self
                .octocrab
                ._get_with_headers(uri.clone(), Some(headers.clone()))
                .await
                .map_err(|source| FetchError::Transport {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            match status {
                StatusCode::OK => {
                    let next = next_link(response.headers());
                    let rate = RateLimitInfo::from_headers(response.headers());
                    if let Some(remaining) = rate.remaining {
                        debug!(remaining, reset = rate.reset, "Rate limit status");
                    }

                    let body = self.octocrab.body_to_string(response).await.map_err(|source| {
                        FetchError::Transport {
                            url: url.to_string(),
                            source,
                        }
                    })?;
                    let payload = serde_json::from_str(&body).map_err(|source| {
                        FetchError::Payload {
                            url: url.to_string(),
                            source,
                        }
                    })?;
                    return Ok(Page { payload, next });
                }
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                    match self.rate_limiter.decide_now(response.headers()) {
                        RetryDecision::Wait(wait) => {
                            warn!(
                                url = %url,
                                status = status.as_u16(),
                                attempt,
                                wait_secs = wait.as_secs(),
                                "Rate limit exceeded, waiting before retry"
                            );
                            tokio::time::sleep(wait).await;
                        }
                        RetryDecision::NotApplicable => {
                            return Err(FetchError::Throttled {
                                url: url.to_string(),
                                status,
                            });
                        }
                    }
                }
                _ => {
                    return Err(FetchError::UnexpectedStatus {
                        url: url.to_string(),
                        status,
                    });
                }
            }
        }
    }
}

/// Returns the `rel="next"` target of the `Link` headers, if any.
#[must_use]
pub fn next_link(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(parse_next_entry)
}

/// Parses one `<url>; rel="..."` entry, returning the URL when it is `next`.
fn parse_next_entry(entry: &str) -> Option<Url> {
    let mut parts = entry.split(';');
    let target = parts
        .next()?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')?;

    let is_next = parts.any(|param| {
        param
            .trim()
            .strip_prefix("rel=")
            .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
            .unwrap_or(false)
    });

    if is_next {
        Url::parse(target).ok()
    } else {
        None
    }
}
