//! Package feeds exposing a v3 service index.
//!
//! A feed is identified by the URL of its service index. The index lists
//! typed endpoints; search goes through the `SearchQueryService` endpoint and
//! downloads through `PackageBaseAddress`.

mod search;
mod service_index;

use std::fmt;

use thiserror::Error;

use crate::http::FetchError;
use crate::version::{VersionKey, VersionParseError, VersionResolver};

pub use search::{FeedClient, SearchResponse, SearchResult, SearchVersion};
pub use service_index::{
    PACKAGE_BASE_ADDRESS, Resource, SEARCH_QUERY_SERVICE, ServiceIndex, ServiceNotFoundError,
};

/// Why a feed could not contribute results.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    ServiceNotFound(#[from] ServiceNotFoundError),

    #[error("Invalid endpoint URL '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

/// A package version found in a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package identifier as listed in the search result (e.g. "Newtonsoft.Json").
    pub id: String,
    /// Self-link of the version entry; the package id when the feed omits it.
    pub name: String,
    pub version: String,
    /// Service index URL of the feed this hit came from.
    pub repository: String,
    key: VersionKey,
}

impl Package {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        repository: impl Into<String>,
    ) -> Result<Self, VersionParseError> {
        let id = id.into();
        let version = version.into();
        let key = VersionResolver::parse(&version)?;
        Ok(Self {
            name: id.clone(),
            id,
            version,
            repository: repository.into(),
            key,
        })
    }

    /// Use the version entry's self-link as the package name.
    pub fn with_self_link(mut self, link: Option<String>) -> Self {
        if let Some(link) = link {
            self.name = link;
        }
        self
    }

    pub fn version_key(&self) -> &VersionKey {
        &self.key
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.version, self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_new() {
        let pkg = Package::new("Foo", "1.0.0-beta", "https://feed.example/v3/index.json").unwrap();
        assert_eq!(pkg.id, "Foo");
        assert_eq!(pkg.name, "Foo");
        assert!(pkg.version_key().is_prerelease());
    }

    #[test]
    fn test_package_new_rejects_bad_version() {
        assert!(Package::new("Foo", "next", "https://feed.example/v3/index.json").is_err());
    }

    #[test]
    fn test_package_with_self_link() {
        let pkg = Package::new("Foo", "1.0.0", "https://feed.example/v3/index.json")
            .unwrap()
            .with_self_link(Some("https://feed.example/reg/foo/1.0.0.json".into()));
        assert_eq!(pkg.name, "https://feed.example/reg/foo/1.0.0.json");
        assert_eq!(pkg.id, "Foo");

        let pkg = Package::new("Foo", "1.0.0", "r").unwrap().with_self_link(None);
        assert_eq!(pkg.name, "Foo");
    }

    #[test]
    fn test_package_display() {
        let pkg = Package::new("Foo", "2.0.0", "https://feed.example/v3/index.json").unwrap();
        assert_eq!(
            pkg.to_string(),
            "Foo 2.0.0 https://feed.example/v3/index.json"
        );
    }
}
