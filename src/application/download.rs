//! Download action - picks one package and fetches its artifact.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use log::{debug, info};
use thiserror::Error;

use crate::download::download_file;
use crate::feed::{FeedClient, PACKAGE_BASE_ADDRESS, Package};
use crate::http::HttpClient;
use crate::runtime::Runtime;
use crate::version::VersionSpec;

/// Which package of an ascending aggregate gets downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// First element, i.e. the lowest matching version.
    #[default]
    Lowest,
    /// Last element, i.e. the highest matching version.
    Highest,
}

impl SelectionPolicy {
    pub fn select(self, mut packages: Vec<Package>) -> Option<Package> {
        match self {
            SelectionPolicy::Lowest => packages.into_iter().next(),
            SelectionPolicy::Highest => packages.pop(),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lowest" => Ok(SelectionPolicy::Lowest),
            "highest" => Ok(SelectionPolicy::Highest),
            other => anyhow::bail!(
                "Invalid selection policy '{}', expected 'lowest' or 'highest'",
                other
            ),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Lowest => write!(f, "lowest"),
            SelectionPolicy::Highest => write!(f, "highest"),
        }
    }
}

/// Nothing matched the requested name and version in any repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no matching package found for {package_name} {spec}")]
pub struct NoPackageFoundError {
    pub package_name: String,
    pub spec: String,
}

/// Pick the package to download from an ascending aggregate.
pub fn select_for_download(
    packages: Vec<Package>,
    policy: SelectionPolicy,
    package_name: &str,
    spec: &VersionSpec,
) -> Result<Package, NoPackageFoundError> {
    policy.select(packages).ok_or_else(|| NoPackageFoundError {
        package_name: package_name.to_string(),
        spec: spec.to_string(),
    })
}

/// File name of a package artifact: `<idLower>.<versionLower>.nupkg`.
pub fn artifact_file_name(package: &Package) -> String {
    format!(
        "{}.{}.nupkg",
        package.id.to_lowercase(),
        package.version.to_lowercase()
    )
}

/// Flat-container URL of a package artifact under `content_base`.
pub fn download_url(content_base: &str, package: &Package) -> String {
    format!(
        "{}/{}/{}/{}",
        content_base.trim_end_matches('/'),
        package.id.to_lowercase(),
        package.version.to_lowercase(),
        artifact_file_name(package)
    )
}

/// A package artifact written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedPackage {
    pub url: String,
    pub path: PathBuf,
}

impl DownloadedPackage {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Download action - resolves the content endpoint of a package's origin
/// repository and streams the artifact into a directory.
pub struct DownloadAction<'a, R: Runtime> {
    runtime: &'a R,
    feed: &'a FeedClient,
    http: &'a HttpClient,
}

impl<'a, R: Runtime> DownloadAction<'a, R> {
    pub fn new(runtime: &'a R, feed: &'a FeedClient, http: &'a HttpClient) -> Self {
        Self {
            runtime,
            feed,
            http,
        }
    }

    /// Resolve the artifact URL of `package` in the repository it came from.
    #[tracing::instrument(skip(self, package))]
    pub async fn locate(&self, package: &Package) -> Result<String> {
        let index = self
            .feed
            .service_index(&package.repository)
            .await
            .with_context(|| format!("Failed to load service index {}", package.repository))?;
        let content_base = index.resolve_endpoint(PACKAGE_BASE_ADDRESS)?;
        debug!("Content endpoint of {}: {}", package.repository, content_base);
        Ok(download_url(content_base, package))
    }

    /// Download `package` from `url` into `dest_dir`, returning the written path.
    #[tracing::instrument(skip(self, package))]
    pub async fn fetch(&self, url: &str, package: &Package, dest_dir: &Path) -> Result<PathBuf> {
        if !self.runtime.exists(dest_dir) {
            self.runtime.create_dir_all(dest_dir)?;
        }

        let path = dest_dir.join(artifact_file_name(package));
        download_file(self.runtime, url, &path, self.http).await?;
        Ok(path)
    }

    /// Locate and fetch `package` into `dest_dir`.
    pub async fn download(&self, package: &Package, dest_dir: &Path) -> Result<DownloadedPackage> {
        info!(
            "Downloading {} {} from {}...",
            package.id, package.version, package.repository
        );
        let url = self.locate(package).await?;
        let path = self.fetch(&url, package, dest_dir).await?;
        Ok(DownloadedPackage { url, path })
    }
}
