//! Search action - queries every feed and merges the results.

use futures_util::stream::{self, StreamExt};
use log::{debug, info};

use crate::catalog::Repository;
use crate::feed::{FeedClient, Package};
use crate::version::{VersionResolver, VersionSpec};

/// Feeds searched at the same time when no limit is configured.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Search action - aggregates per-feed searches into one ordered list.
pub struct SearchAction<'a> {
    feed: &'a FeedClient,
    concurrency: usize,
}

impl<'a> SearchAction<'a> {
    pub fn new(feed: &'a FeedClient) -> Self {
        Self {
            feed,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit how many feeds are queried at the same time (at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Search every repository and return all matches sorted ascending by version.
    ///
    /// Per-feed contributions are concatenated in repository order before a
    /// stable sort, so among equal versions the earlier repository comes first
    /// regardless of which request finished first.
    #[tracing::instrument(skip(self, repositories, spec))]
    pub async fn aggregate(
        &self,
        repositories: &[Repository],
        package_name: &str,
        spec: &VersionSpec,
    ) -> Vec<Package> {
        info!(
            "Searching {} repositories for {} ({})...",
            repositories.len(),
            package_name,
            spec
        );

        let contributions: Vec<Vec<Package>> = stream::iter(repositories)
            .map(|repo| self.feed.search(&repo.url, package_name, spec))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut packages: Vec<Package> = contributions.into_iter().flatten().collect();
        packages.sort_by(|a, b| VersionResolver::compare(a.version_key(), b.version_key()));

        debug!("Found {} matching package(s)", packages.len());
        packages
    }
}
