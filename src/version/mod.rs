//! Version parsing, ordering and matching.
//!
//! [`VersionKey`] turns heterogeneous package version strings into a totally
//! ordered key; [`VersionSpec`] filters versions by exact value or textual
//! prefix.

mod key;
mod spec;

use std::cmp::Ordering;

pub use key::{MAX_RELEASE_SEGMENTS, VersionKey, VersionParseError};
pub use spec::VersionSpec;

/// Version resolver - pure functions over version strings.
pub struct VersionResolver;

impl VersionResolver {
    /// Parse a version string into its ordering key.
    pub fn parse(version: &str) -> Result<VersionKey, VersionParseError> {
        VersionKey::parse(version)
    }

    /// Compare two parsed versions by precedence.
    pub fn compare(a: &VersionKey, b: &VersionKey) -> Ordering {
        a.cmp(b)
    }

    /// Check a version string against a spec.
    pub fn matches(version: &str, spec: &VersionSpec) -> bool {
        spec.matches(version)
    }
}
