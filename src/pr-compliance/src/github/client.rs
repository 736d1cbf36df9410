//! Octocrab client construction.

use super::FetchError;
use http::Uri;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use rustls::crypto::CryptoProvider;
use url::Url;

/// Installs aws-lc-rs as the process-wide rustls provider unless one is set.
///
/// Octocrab's default features compile in ring while this crate selects
/// aws-lc-rs, so rustls cannot pick a provider on its own.
pub fn install_crypto_provider() {
    if CryptoProvider::get_default().is_none() {
        // Losing a race to another installer is fine; any provider will do.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    }
}

/// Builds an unauthenticated Octocrab client rooted at `api_base`.
///
/// Octocrab's built-in retry layer is disabled: every re-send goes through
/// the fetcher's rate-limit handling, and other failures are never retried.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] when the base URI cannot be parsed and
/// [`FetchError::Transport`] when Octocrab fails to construct a client.
pub fn build_client(api_base: &Url) -> Result<Octocrab, FetchError> {
    let base_uri: Uri = api_base
        .as_str()
        .parse::<Uri>()
        .map_err(|e| FetchError::InvalidUrl {
            url: api_base.to_string(),
            message: e.to_string(),
        })?;

    install_crypto_provider();

    Octocrab::builder()
        .add_retry_config(RetryConfig::None)
        .base_uri(base_uri)
        .and_then(|builder| builder.build())
        .map_err(|source| FetchError::Transport {
            url: api_base.to_string(),
            source,
        })
}

/// Appends path segments to `base`, percent-encoding each one.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base` cannot carry a path.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| FetchError::InvalidUrl {
            url: base.to_string(),
            message: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
