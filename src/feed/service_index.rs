//! Service index documents and endpoint resolution.

use serde::Deserialize;
use thiserror::Error;

use crate::http::{FetchError, JsonFetcher, fetch_typed};

/// Resource type prefix of the search endpoint.
pub const SEARCH_QUERY_SERVICE: &str = "SearchQueryService/3.0";

/// Resource type prefix of the flat-container download endpoint.
pub const PACKAGE_BASE_ADDRESS: &str = "PackageBaseAddress/3.0";

/// A repository's index does not advertise a required service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to find a {service} resource in {index_url}")]
pub struct ServiceNotFoundError {
    pub service: String,
    pub index_url: String,
}

/// One typed endpoint listed in a service index.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Resource {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
}

/// A repository's service index.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceIndex {
    #[serde(skip)]
    pub url: String,
    pub resources: Vec<Resource>,
}

impl ServiceIndex {
    /// Fetch and validate the index document at `url`.
    #[tracing::instrument(skip(fetcher))]
    pub async fn fetch<F: JsonFetcher + ?Sized>(fetcher: &F, url: &str) -> Result<Self, FetchError> {
        let mut index: ServiceIndex = fetch_typed(fetcher, url).await?;
        index.url = url.to_string();
        Ok(index)
    }

    /// Endpoint of the first resource, in document order, whose type starts
    /// with `type_prefix`.
    pub fn resolve_endpoint(&self, type_prefix: &str) -> Result<&str, ServiceNotFoundError> {
        self.resources
            .iter()
            .find(|r| r.kind.starts_with(type_prefix))
            .map(|r| r.id.as_str())
            .ok_or_else(|| ServiceNotFoundError {
                service: type_prefix.to_string(),
                index_url: self.url.clone(),
            })
    }
}
