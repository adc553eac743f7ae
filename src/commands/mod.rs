use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::{
    application::{DownloadAction, DownloadedPackage, SearchAction, SelectionPolicy, select_for_download},
    catalog::{Repository, RepositoryCatalog},
    feed::Package,
    runtime::Runtime,
    version::VersionSpec,
};

pub mod config;
pub mod services;

use config::Config;
use services::Services;

/// Printed by `search` when nothing matched.
pub const NO_MATCHES: &str = "No matching packages found.";

/// List the repositories the configured selection resolves to
#[tracing::instrument(skip(runtime, config))]
pub fn list_repositories<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let catalog = RepositoryCatalog::builtin();
    let repositories = catalog.select(&runtime, &config.selection)?;

    for line in repository_lines(&repositories) {
        println!("{}", line);
    }
    Ok(())
}

/// Search the configured repositories and print every match
#[tracing::instrument(skip(runtime, config))]
pub async fn search<R: Runtime>(
    runtime: R,
    config: Config,
    package_name: &str,
    version: Option<&str>,
) -> Result<()> {
    let services = Services::from_config(&config)?;
    let spec = VersionSpec::from(version);
    let packages = find_packages(&runtime, &config, &services, package_name, &spec).await?;

    for line in search_lines(&packages) {
        println!("{}", line);
    }
    Ok(())
}

/// Select one matching package and download it into `output_dir`
#[tracing::instrument(skip(runtime, config))]
pub async fn download<R: Runtime>(
    runtime: R,
    config: Config,
    package_name: &str,
    version: Option<&str>,
    policy: SelectionPolicy,
    output_dir: &Path,
) -> Result<()> {
    let services = Services::from_config(&config)?;
    let spec = VersionSpec::from(version);
    let packages = find_packages(&runtime, &config, &services, package_name, &spec).await?;

    let selected = select_for_download(packages, policy, package_name, &spec)?;
    debug!(
        "Selected {} {} from {} ({})",
        selected.id, selected.version, selected.repository, policy
    );

    let downloaded = DownloadAction::new(&runtime, &services.feed, &services.http)
        .download(&selected, output_dir)
        .await?;

    for line in download_lines(&downloaded, config.verbose) {
        println!("{}", line);
    }
    Ok(())
}

async fn find_packages<R: Runtime>(
    runtime: &R,
    config: &Config,
    services: &Services,
    package_name: &str,
    spec: &VersionSpec,
) -> Result<Vec<Package>> {
    let repositories = services.catalog.select(runtime, &config.selection)?;
    debug!("Searching {} repositories", repositories.len());

    Ok(SearchAction::new(&services.feed)
        .with_concurrency(config.jobs)
        .aggregate(&repositories, package_name, spec)
        .await)
}

pub(crate) fn repository_lines(repositories: &[Repository]) -> Vec<String> {
    repositories.iter().map(ToString::to_string).collect()
}

pub(crate) fn search_lines(packages: &[Package]) -> Vec<String> {
    if packages.is_empty() {
        return vec![NO_MATCHES.to_string()];
    }
    packages.iter().map(ToString::to_string).collect()
}

pub(crate) fn download_lines(downloaded: &DownloadedPackage, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if verbose {
        lines.push(downloaded.url.clone());
    }
    lines.push(downloaded.file_name());
    lines
}
