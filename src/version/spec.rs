//! Version specifications supplied on the command line.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Constraint on which versions a search returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionSpec {
    /// No constraint; every version matches.
    #[default]
    Any,
    /// Exact string equality.
    Exact(String),
    /// Trailing wildcard: matches any version starting with this text.
    Prefix(String),
}

impl VersionSpec {
    /// Parse a raw spec. An empty string means [`VersionSpec::Any`], a
    /// trailing `*` makes a [`VersionSpec::Prefix`].
    pub fn parse(spec: &str) -> Self {
        if spec.is_empty() {
            VersionSpec::Any
        } else if let Some(prefix) = spec.strip_suffix('*') {
            VersionSpec::Prefix(prefix.to_string())
        } else {
            VersionSpec::Exact(spec.to_string())
        }
    }

    /// Check a version string against this spec.
    ///
    /// Prefix matching is purely textual: "1.2*" matches "1.20.0".
    pub fn matches(&self, version: &str) -> bool {
        match self {
            VersionSpec::Any => true,
            VersionSpec::Exact(exact) => version == exact,
            VersionSpec::Prefix(prefix) => version.starts_with(prefix.as_str()),
        }
    }
}

impl From<Option<&str>> for VersionSpec {
    fn from(spec: Option<&str>) -> Self {
        spec.map(VersionSpec::parse).unwrap_or_default()
    }
}

impl FromStr for VersionSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(VersionSpec::parse(s))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Any => write!(f, "any version"),
            VersionSpec::Exact(exact) => write!(f, "{}", exact),
            VersionSpec::Prefix(prefix) => write!(f, "{}*", prefix),
        }
    }
}
