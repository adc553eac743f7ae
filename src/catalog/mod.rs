//! Repository catalog.
//!
//! Builds the ordered list of feeds a command searches: the built-in alias
//! table, a single repository given on the command line, or a list file.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::runtime::Runtime;

/// Alias of the public nuget.org feed.
pub const NUGET_ORG: &str = "nuget.org";

const AZURE_DNCENG: &str = "https://pkgs.dev.azure.com/dnceng/public/_packaging";

/// Built-in feeds, in search order.
fn builtin_entries() -> Vec<(&'static str, String)> {
    let dnceng = |feed: &str| format!("{}/{}/nuget/v3/index.json", AZURE_DNCENG, feed);
    vec![
        ("dotnet5", dnceng("dotnet5")),
        ("dotnet5-transport", dnceng("dotnet5-transport")),
        ("dotnet6", dnceng("dotnet6")),
        ("dotnet6-transport", dnceng("dotnet6-transport")),
        ("dotnet7", dnceng("dotnet7")),
        ("dotnet7-transport", dnceng("dotnet7-transport")),
        ("dotnet-eng", dnceng("dotnet-eng")),
        ("dotnet-experimental", dnceng("dotnet-experimental")),
        ("dotnet-libraries", dnceng("dotnet-libraries")),
        ("dotnet-libraries-transport", dnceng("dotnet-libraries-transport")),
        ("dotnet-public", dnceng("dotnet-public")),
        ("dotnet-public-local", dnceng("dotnet-public%40local")),
        ("dotnet-tools", dnceng("dotnet-tools")),
        ("dotnet-tools-transport", dnceng("dotnet-tools-transport")),
        (
            "messagepack-csharp",
            "https://pkgs.dev.azure.com/ils0086/messagepack-csharp/_packaging/messagepack-ci/nuget/v3/index.json"
                .to_string(),
        ),
        (
            "myget-applicationinsights",
            "https://www.myget.org/f/applicationinsights/api/v3/index.json".to_string(),
        ),
        (
            "myget-aspnet-contrib",
            "https://www.myget.org/f/aspnet-contrib/api/v3/index.json".to_string(),
        ),
        (NUGET_ORG, "https://api.nuget.org/v3/index.json".to_string()),
    ]
}

/// A feed to search: its service index URL and, for catalog entries, an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub alias: Option<String>,
    pub url: String,
}

impl Repository {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            alias: None,
            url: url.into(),
        }
    }

    pub fn with_alias(alias: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            url: url.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} (alias: {})", self.url, alias),
            None => write!(f, "{}", self.url),
        }
    }
}

/// How the user chose which feeds to search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RepositorySelection {
    /// Every feed in the catalog.
    #[default]
    All,
    /// One alias or index URL.
    Single(String),
    /// A file listing one index URL per line.
    ListFile(PathBuf),
}

/// Ordered alias → index URL table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCatalog {
    entries: Vec<Repository>,
}

impl RepositoryCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self::from_entries(
            builtin_entries()
                .into_iter()
                .map(|(alias, url)| Repository::with_alias(alias, url))
                .collect(),
        )
    }

    pub fn from_entries(entries: Vec<Repository>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Repository] {
        &self.entries
    }

    /// Look up an alias; anything unknown is taken as an index URL.
    pub fn resolve(&self, alias_or_url: &str) -> Repository {
        self.entries
            .iter()
            .find(|r| r.alias.as_deref() == Some(alias_or_url))
            .cloned()
            .unwrap_or_else(|| Repository::new(alias_or_url))
    }

    /// Parse a repository list: one index URL per line, blank lines and
    /// `#` comments ignored.
    pub fn parse_list(contents: &str) -> Vec<Repository> {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Repository::new)
            .collect()
    }

    /// Load a repository list file.
    pub fn load_list<R: Runtime>(runtime: &R, path: &Path) -> Result<Vec<Repository>> {
        let contents = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read repository list {}", path.display()))?;
        let repositories = Self::parse_list(&contents);
        debug!(
            "Loaded {} repositories from {}",
            repositories.len(),
            path.display()
        );
        Ok(repositories)
    }

    /// Resolve a selection into the ordered list of feeds to search.
    pub fn select<R: Runtime>(
        &self,
        runtime: &R,
        selection: &RepositorySelection,
    ) -> Result<Vec<Repository>> {
        match selection {
            RepositorySelection::All => Ok(self.entries.clone()),
            RepositorySelection::Single(alias_or_url) => Ok(vec![self.resolve(alias_or_url)]),
            RepositorySelection::ListFile(path) => Self::load_list(runtime, path),
        }
    }
}

impl Default for RepositoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
