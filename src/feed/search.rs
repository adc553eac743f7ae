//! Search query engine for a single feed.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::Url;
use serde::Deserialize;

use super::{FeedError, Package, SEARCH_QUERY_SERVICE, ServiceIndex};
use crate::http::{FetchError, JsonFetcher, fetch_typed};
use crate::version::{VersionResolver, VersionSpec};

/// Search endpoint response.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub data: Vec<SearchResult>,
}

/// One package in a search response.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub versions: Vec<SearchVersion>,
}

/// One version of a package in a search response.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SearchVersion {
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    pub version: String,
}

/// Queries feeds through an injected [`JsonFetcher`].
#[derive(Clone)]
pub struct FeedClient {
    fetcher: Arc<dyn JsonFetcher>,
}

impl FeedClient {
    pub fn new(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch the service index of the feed at `index_url`.
    pub async fn service_index(&self, index_url: &str) -> Result<ServiceIndex, FetchError> {
        ServiceIndex::fetch(self.fetcher.as_ref(), index_url).await
    }

    /// Build the search request URL for `package_name` against a search endpoint.
    pub fn search_url(endpoint: &str, package_name: &str) -> Result<String, FeedError> {
        Url::parse_with_params(
            endpoint,
            &[
                ("q", package_name),
                ("prerelease", "true"),
                ("semVerLevel", "2.0.0"),
            ],
        )
        .map(String::from)
        .map_err(|e| FeedError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    /// Search one feed.
    ///
    /// A feed that cannot be reached, lacks a search service, or answers with
    /// something unusable contributes no packages; the reason is logged.
    #[tracing::instrument(skip(self, spec))]
    pub async fn search(&self, index_url: &str, package_name: &str, spec: &VersionSpec) -> Vec<Package> {
        match self.try_search(index_url, package_name, spec).await {
            Ok(packages) => {
                debug!("{} matching version(s) in {}", packages.len(), index_url);
                packages
            }
            Err(e) => {
                warn!("Skipping repository {}: {}", index_url, e);
                Vec::new()
            }
        }
    }

    /// Search one feed, reporting why it could not be searched.
    pub async fn try_search(
        &self,
        index_url: &str,
        package_name: &str,
        spec: &VersionSpec,
    ) -> Result<Vec<Package>, FeedError> {
        let index = self.service_index(index_url).await?;
        let endpoint = index.resolve_endpoint(SEARCH_QUERY_SERVICE)?;
        let url = Self::search_url(endpoint, package_name)?;
        debug!("Searching {}...", url);

        let response: SearchResponse = fetch_typed(self.fetcher.as_ref(), &url).await?;
        Ok(collect_packages(response, index_url, spec))
    }
}

/// Turn a search response into packages ordered by id, then by version.
///
/// Versions that cannot be parsed are skipped with a warning.
fn collect_packages(mut response: SearchResponse, repository: &str, spec: &VersionSpec) -> Vec<Package> {
    response.data.sort_by(|a, b| a.id.cmp(&b.id));

    let mut packages = Vec::new();
    for result in response.data {
        let mut versions: Vec<Package> = result
            .versions
            .into_iter()
            .filter_map(|entry| match Package::new(&result.id, entry.version, repository) {
                Ok(package) => Some(package.with_self_link(entry.id)),
                Err(e) => {
                    warn!("Skipping {} in {}: {}", result.id, repository, e);
                    None
                }
            })
            .collect();

        versions.sort_by(|a, b| VersionResolver::compare(a.version_key(), b.version_key()));
        packages.extend(
            versions
                .into_iter()
                .filter(|p| VersionResolver::matches(&p.version, spec)),
        );
    }

    packages
}
