//! GitHub REST access.
//!
//! All requests go through [`PaginatedFetcher`], which follows `Link`
//! pagination and sits out rate limiting. Higher-level listing lives in
//! [`crate::discovery`] and [`crate::pull_requests`].

mod client;
mod error;
mod pagination;

pub use client::{build_client, endpoint, install_crypto_provider};
pub use error::FetchError;
pub use pagination::{next_link, PaginatedFetcher, Pages};
