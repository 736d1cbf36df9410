//! Repository discovery for an organization.
//!
//! Lists every repository of an organization through the paginated
//! `/orgs/{org}/repos` endpoint.

mod repository;

pub use repository::{Repository, RepositoryOwner};

use crate::github::{endpoint, FetchError, PaginatedFetcher};
use tracing::{info, info_span, warn, Instrument};

/// Repositories found for an organization.
///
/// When listing stopped early, `repositories` holds what was found before the
/// failure and `failure` says why.
#[derive(Debug, Default)]
pub struct RepositoryListing {
    /// Repositories in API order.
    pub repositories: Vec<Repository>,

    /// Why listing stopped early, if it did.
    pub failure: Option<FetchError>,
}

impl RepositoryListing {
    /// Returns the repository names in API order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }

    /// Returns true if every page was listed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Lists all repositories of `organization`.
///
/// Never fails outright: partial results are returned together with the
/// failure that cut the listing short.
pub async fn list_repositories(
    fetcher: &PaginatedFetcher,
    organization: &str,
) -> RepositoryListing {
    let span = info_span!("list_repositories", organization = %organization);

    async {
        info!("Listing repositories");

        let url = match endpoint(fetcher.api_base(), &["orgs", organization, "repos"]) {
            Ok(url) => url,
            Err(e) => {
                return RepositoryListing {
                    repositories: Vec::new(),
                    failure: Some(e),
                }
            }
        };

        let per_page = fetcher.per_page().to_string();
        let pages = fetcher
            .fetch(url, &[("per_page", per_page.as_str())], None)
            .await;
        let (items, failure) = pages.into_items();

        let repositories: Vec<Repository> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Repository>(item) {
                Ok(repository) => Some(repository),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed repository entry");
                    None
                }
            })
            .collect();

        match &failure {
            None => info!(count = repositories.len(), "Listing complete"),
            Some(e) => warn!(
                count = repositories.len(),
                error = %e,
                "Listing incomplete, keeping repositories found so far"
            ),
        }

        RepositoryListing {
            repositories,
            failure,
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimiter;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo(id: u64, name: &str) -> serde_json::Value {
        json!({ "id": id, "name": name, "owner": { "login": "Scytale-exercise" }, "private": false })
    }

    async fn fetcher_for(server: &MockServer) -> PaginatedFetcher {
        let api_base = Url::parse(&server.uri()).unwrap();
        let octocrab = crate::github::build_client(&api_base).unwrap();
        PaginatedFetcher::new(octocrab, RateLimiter::new(Duration::ZERO), api_base, 100)
    }

    #[tokio::test]
    async fn lists_repositories_across_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo(3, "gamma")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .and(query_param("per_page", "100"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([repo(1, "alpha"), repo(2, "beta")]))
                    .insert_header(
                        "link",
                        format!(
                            "<{}/orgs/acme/repos?per_page=100&page=2>; rel=\"next\"",
                            server.uri()
                        )
                        .as_str(),
                    ),
            )
            .mount(&server)
            .await;

        let listing = list_repositories(&fetcher_for(&server).await, "acme").await;

        assert!(listing.is_complete());
        assert_eq!(listing.names(), vec!["alpha", "beta", "gamma"]);
        assert_eq!(listing.repositories[0].id, 1);
        assert_eq!(listing.repositories[0].owner.login, "Scytale-exercise");
    }

    #[tokio::test]
    async fn keeps_first_page_when_second_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([repo(1, "alpha")]))
                    .insert_header(
                        "link",
                        format!("<{}/orgs/acme/repos?page=2>; rel=\"next\"", server.uri())
                            .as_str(),
                    ),
            )
            .mount(&server)
            .await;

        let listing = list_repositories(&fetcher_for(&server).await, "acme").await;

        assert!(!listing.is_complete());
        assert_eq!(listing.names(), vec!["alpha"]);
    }

    #[tokio::test]
    async fn empty_organization_is_complete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/empty/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let listing = list_repositories(&fetcher_for(&server).await, "empty").await;

        assert!(listing.is_complete());
        assert!(listing.repositories.is_empty());
    }

    #[tokio::test]
    async fn skips_malformed_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "name": "no-id" }, repo(7, "ok")])),
            )
            .mount(&server)
            .await;

        let listing = list_repositories(&fetcher_for(&server).await, "acme").await;

        assert_eq!(listing.names(), vec!["ok"]);
    }
}
